//! Post-run CSV export with participant anonymization.
//!
//! Three fixed-schema artifacts are written: the player's game record, the
//! per-tick orderbook dump, and the trade log. Every bot name except the
//! designated player's is replaced by `ANONYMOUS`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::product::ProductCatalog;
use crate::record::GameLog;
use crate::types::Symbol;
use crate::Side;

pub const ANONYMOUS: &str = "ANONYMOUS";

pub const GAME_RECORD_FILE: &str = "log_game_record.csv";
pub const ORDERBOOK_FILE: &str = "log_orderbook_data.csv";
pub const TRADES_FILE: &str = "log_trades_data.csv";

/// Write the CSV triple into `dir`, creating it if needed.
pub fn export_game(
    log: &GameLog,
    catalog: &ProductCatalog,
    player: Symbol,
    dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_game_record(log, catalog, player, &dir.join(GAME_RECORD_FILE))?;
    write_orderbook_data(log, player, &dir.join(ORDERBOOK_FILE))?;
    write_trades_data(log, player, &dir.join(TRADES_FILE))?;
    Ok(())
}

/// `timestamp, Loop, <player>_<ticker>…, <player>_Cash, <player>_PnL, <ticker>…`
fn write_game_record(
    log: &GameLog,
    catalog: &ProductCatalog,
    player: Symbol,
    path: &Path,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    write!(out, "timestamp,Loop")?;
    for product in catalog.iter() {
        write!(out, ",{player}_{}", product.ticker)?;
    }
    write!(out, ",{player}_Cash,{player}_PnL")?;
    for product in catalog.iter() {
        write!(out, ",{}", product.ticker)?;
    }
    writeln!(out)?;

    for report in &log.reports {
        write!(out, "{},{}", report.loop_num, report.loop_num)?;
        for product in catalog.iter() {
            let position = report
                .positions
                .iter()
                .find(|(t, _)| *t == product.ticker)
                .map_or(0, |(_, p)| *p);
            write!(out, ",{position}")?;
        }
        write!(out, ",{},{}", report.cash, report.pnl)?;
        for product in catalog.iter() {
            let mid = report
                .mids
                .iter()
                .find(|(t, _)| *t == product.ticker)
                .map_or(0.0, |(_, m)| *m);
            write!(out, ",{mid}")?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

/// `timestamp, ticker, side, price, size, bot_name`
fn write_orderbook_data(log: &GameLog, player: Symbol, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "timestamp,ticker,side,price,size,bot_name")?;

    for (tick, view) in log.books.iter().enumerate() {
        for tv in view.iter() {
            for (side, rests) in [(Side::Buy, &tv.bids), (Side::Sell, &tv.asks)] {
                for rest in rests {
                    let bot = if rest.bot == player {
                        rest.bot.as_str()
                    } else {
                        ANONYMOUS
                    };
                    writeln!(
                        out,
                        "{tick},{},{},{},{},{bot}",
                        tv.ticker,
                        side.book_name(),
                        rest.price,
                        rest.size
                    )?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// `timestamp, ticker, price, size, side, agg_bot, rest_bot`
fn write_trades_data(log: &GameLog, player: Symbol, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "timestamp,ticker,price,size,side,agg_bot,rest_bot")?;

    for trade in &log.trades {
        let side = match trade.agg_side {
            Side::Buy => "buy",
            Side::Sell => "sell",
        };
        let agg = if trade.agg_bot == player {
            trade.agg_bot.as_str()
        } else {
            ANONYMOUS
        };
        let rest = if trade.rest_bot == player {
            trade.rest_bot.as_str()
        } else {
            ANONYMOUS
        };
        writeln!(
            out,
            "{},{},{},{},{side},{agg},{rest}",
            trade.loop_num, trade.ticker, trade.price, trade.size
        )?;
    }

    out.flush()?;
    Ok(())
}
