//! Book views and the per-tick observation record.

use crate::engine::Engine;
use crate::types::{Position, Price, Size, Symbol};
use crate::trade::Trade;

/// One resting order as agents see it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestView {
    pub price: Price,
    pub size: Size,
    pub bot: Symbol,
}

/// Both sides of one product, most aggressive first, FIFO within a price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerView {
    pub ticker: Symbol,
    pub bids: Vec<RestView>,
    pub asks: Vec<RestView>,
}

/// Read-only view of every book, in catalog order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookView {
    entries: Vec<TickerView>,
}

impl BookView {
    pub fn ticker(&self, ticker: Symbol) -> Option<&TickerView> {
        self.entries.iter().find(|tv| tv.ticker == ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickerView> {
        self.entries.iter()
    }
}

impl Engine {
    /// Shallow copy of every book in priority order.
    pub fn snapshot(&self) -> BookView {
        fn views<'a>(rests: impl Iterator<Item = &'a crate::order::Rest>) -> Vec<RestView> {
            rests
                .map(|r| RestView {
                    price: r.price,
                    size: r.size,
                    bot: r.bot,
                })
                .collect()
        }

        let entries = self
            .catalog()
            .iter()
            .map(|product| {
                let ticker = product.ticker;
                match self.book(ticker) {
                    Some(book) => TickerView {
                        ticker,
                        bids: views(book.bids().rests_best_to_worst()),
                        asks: views(book.asks().rests_best_to_worst()),
                    },
                    None => TickerView {
                        ticker,
                        bids: Vec::new(),
                        asks: Vec::new(),
                    },
                }
            })
            .collect();
        BookView { entries }
    }
}

/// The designated player's state at the end of one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub loop_num: u64,
    /// Positions per ticker, in catalog order.
    pub positions: Vec<(Symbol, Position)>,
    pub cash: f64,
    pub pnl: f64,
    /// Estimated mid per ticker, in catalog order.
    pub mids: Vec<(Symbol, f64)>,
}

/// Everything recorded over a run, for post-run export.
///
/// A pure sink: nothing here feeds back into matching.
#[derive(Clone, Debug, Default)]
pub struct GameLog {
    /// End-of-tick book state, one entry per tick.
    pub books: Vec<BookView>,
    /// Every trade of the run, in execution order.
    pub trades: Vec<Trade>,
    /// One report per tick for the designated player.
    pub reports: Vec<TickReport>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }
}
