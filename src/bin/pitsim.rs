//! CLI entry point: run a configured game and export the CSV artifacts.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use pitsim::agent::{PlayerAgent, ScriptedAction, ScriptedAgent};
use pitsim::config::Config;
use pitsim::{export, Engine, Game, ProductCatalog, Side};

#[derive(Parser)]
#[command(name = "pitsim")]
#[command(about = "Deterministic multi-product trading-game simulator")]
#[command(version)]
struct Cli {
    /// Path to the game configuration
    #[arg(long, default_value = "pitsim.toml")]
    config: PathBuf,

    /// Override the configured tick horizon
    #[arg(long)]
    ticks: Option<u64>,

    /// Directory for the exported CSV files
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Warn on cancels of unknown or dead order ids
    #[arg(long)]
    removal_warnings: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };
    let catalog = match config.catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error building product catalog: {e}");
            process::exit(1);
        }
    };

    let ticks = cli.ticks.unwrap_or(config.game.ticks);

    let engine = if cli.removal_warnings {
        Engine::with_removal_warnings(catalog.clone())
    } else {
        Engine::new(catalog.clone())
    };

    let mut game = Game::new(engine);
    for agent in demo_market(&catalog, ticks) {
        game.add_agent(agent);
    }
    game.add_agent(Box::new(PlayerAgent::new(&config.game.player, &catalog)));

    log::info!("running {ticks} ticks over {} products", catalog.len());
    game.run(ticks);
    log::info!(
        "{} trades across {} ticks",
        game.log().trades.len(),
        game.loop_num()
    );

    let player = game
        .player()
        .unwrap_or_else(|| pitsim::Symbol::new(&config.game.player));
    if let Err(e) = export::export_game(game.log(), &catalog, player, &cli.out) {
        eprintln!("Error exporting game data: {e}");
        process::exit(1);
    }

    println!("Final PnL: {}", game.final_pnl().unwrap_or(0.0));
}

/// Deterministic background liquidity so a run produces non-trivial books
/// and trades: one agent re-quotes a spread around the default mid, another
/// periodically crosses it from alternating sides.
fn demo_market(catalog: &ProductCatalog, ticks: u64) -> Vec<Box<dyn pitsim::agent::Agent>> {
    let mut quoter_script = Vec::new();
    let mut crosser_script = Vec::new();

    for tick in 0..ticks {
        if tick % 10 == 0 {
            if tick > 0 {
                quoter_script.push((tick, ScriptedAction::CancelAll));
            }
            // Drift the quoted mid slowly so the record has some motion.
            let mid = 1000.0 + (tick / 50) as f64;
            for product in catalog.iter() {
                let half_spread = product.mpv.to_f64() * 5.0;
                quoter_script.push((
                    tick,
                    ScriptedAction::Quote {
                        ticker: product.ticker,
                        price: mid - half_spread,
                        size: 30,
                        side: Side::Buy,
                    },
                ));
                quoter_script.push((
                    tick,
                    ScriptedAction::Quote {
                        ticker: product.ticker,
                        price: mid + half_spread,
                        size: 30,
                        side: Side::Sell,
                    },
                ));
            }
        }
        if tick % 25 == 5 {
            let mid = 1000.0 + (tick / 50) as f64;
            for product in catalog.iter() {
                let sweep = product.mpv.to_f64() * 10.0;
                let (price, side) = if tick % 50 == 5 {
                    (mid + sweep, Side::Buy)
                } else {
                    (mid - sweep, Side::Sell)
                };
                crosser_script.push((
                    tick,
                    ScriptedAction::Quote {
                        ticker: product.ticker,
                        price,
                        size: 10,
                        side,
                    },
                ));
            }
        }
    }

    vec![
        Box::new(ScriptedAgent::new("quoter", catalog, quoter_script)),
        Box::new(ScriptedAgent::new("crosser", catalog, crosser_script)),
    ]
}
