//! Agents: the polymorphic participant interface and two concrete
//! implementations.
//!
//! The game loop only sees `dyn Agent`; all shared accounting lives in
//! [`Ledger`], which concrete agents compose.

use crate::ledger::{round_to_mpv, Ledger, RoundMode};
use crate::message::{ConversionOutcome, Message};
use crate::product::ProductCatalog;
use crate::record::{BookView, TickReport};
use crate::trade::Trade;
use crate::types::{Size, Symbol};
use crate::Side;

/// A participant in the game.
///
/// Per tick the game loop calls `on_book` (collecting the tick's messages),
/// then `on_trades` with everything that executed, then `end_of_tick` for
/// bookkeeping against the end-of-tick book.
pub trait Agent {
    fn name(&self) -> Symbol;

    /// Observe the start-of-tick book and return this tick's messages.
    fn on_book(&mut self, view: &BookView) -> Vec<Message>;

    /// Receive every trade executed this tick (own and others').
    fn on_trades(&mut self, trades: &[Trade]);

    /// Receive the result of an own conversion request.
    fn on_conversion(&mut self, outcome: &ConversionOutcome) {
        let _ = outcome;
    }

    /// Per-tick bookkeeping against the end-of-tick book.
    fn end_of_tick(&mut self, view: &BookView);

    /// State report for the game record. Only the designated player
    /// returns `Some`.
    fn tick_report(&self, loop_num: u64, view: &BookView) -> Option<TickReport> {
        let _ = (loop_num, view);
        None
    }

    /// Re-base the agent's order id counter onto a disjoint block.
    fn set_order_id_base(&mut self, base: u64) {
        let _ = base;
    }
}

/// The tracked participant: accounting and observation only, no orders.
///
/// Maintains positions, fines, and mid-price memory, and reports its state
/// each tick for the game record.
pub struct PlayerAgent {
    ledger: Ledger,
}

impl PlayerAgent {
    pub fn new(name: &str, catalog: &ProductCatalog) -> Self {
        Self {
            ledger: Ledger::new(Symbol::new(name), catalog),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl Agent for PlayerAgent {
    fn name(&self) -> Symbol {
        self.ledger.name()
    }

    fn on_book(&mut self, _view: &BookView) -> Vec<Message> {
        Vec::new()
    }

    fn on_trades(&mut self, trades: &[Trade]) {
        self.ledger.apply_trades(trades);
    }

    fn on_conversion(&mut self, outcome: &ConversionOutcome) {
        self.ledger.apply_conversion(outcome);
    }

    fn end_of_tick(&mut self, view: &BookView) {
        self.ledger.apply_fines();
        self.ledger.update_memory(view);
    }

    fn tick_report(&self, loop_num: u64, view: &BookView) -> Option<TickReport> {
        Some(TickReport {
            loop_num,
            positions: self.ledger.position_row(),
            cash: self.ledger.cash(),
            pnl: self.ledger.pnl(view),
            mids: self.ledger.mid_row(view),
        })
    }

    fn set_order_id_base(&mut self, base: u64) {
        self.ledger.set_next_id(base);
    }
}

/// One step of a scripted agent's schedule.
#[derive(Clone, Debug)]
pub enum ScriptedAction {
    /// Place a limit order; the price is rounded to the product's MPV.
    Quote {
        ticker: Symbol,
        price: f64,
        size: Size,
        side: Side,
    },
    /// Cancel every outstanding order.
    CancelAll,
    /// Request a composite-product conversion.
    Convert {
        ticker: Symbol,
        size: Size,
        side: Side,
    },
}

/// A deterministic participant driven by a fixed per-tick schedule.
///
/// Replays the same message stream on every run, which is what makes whole
/// games reproducible end to end. Used by the integration tests and the CLI
/// demo market.
pub struct ScriptedAgent {
    ledger: Ledger,
    script: Vec<(u64, ScriptedAction)>,
    tick: u64,
}

impl ScriptedAgent {
    pub fn new(name: &str, catalog: &ProductCatalog, script: Vec<(u64, ScriptedAction)>) -> Self {
        Self {
            ledger: Ledger::new(Symbol::new(name), catalog),
            script,
            tick: 0,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl Agent for ScriptedAgent {
    fn name(&self) -> Symbol {
        self.ledger.name()
    }

    fn on_book(&mut self, _view: &BookView) -> Vec<Message> {
        let due: Vec<ScriptedAction> = self
            .script
            .iter()
            .filter(|(tick, _)| *tick == self.tick)
            .map(|(_, action)| action.clone())
            .collect();

        let mut messages = Vec::new();
        for action in due {
            match action {
                ScriptedAction::Quote {
                    ticker,
                    price,
                    size,
                    side,
                } => {
                    let Some(mpv) = self.ledger.mpv(ticker) else {
                        log::warn!("{}: skipping quote for unknown ticker {ticker}", self.name());
                        continue;
                    };
                    let price = round_to_mpv(price, mpv, RoundMode::Nearest);
                    match self.ledger.create_order(ticker, price, size, side) {
                        Ok(message) => messages.push(message),
                        Err(e) => log::warn!("{}: skipping quote: {e}", self.name()),
                    }
                }
                ScriptedAction::CancelAll => messages.extend(self.ledger.cancel_all()),
                ScriptedAction::Convert { ticker, size, side } => {
                    messages.push(self.ledger.conversion(ticker, size, side));
                }
            }
        }
        messages
    }

    fn on_trades(&mut self, trades: &[Trade]) {
        self.ledger.apply_trades(trades);
    }

    fn on_conversion(&mut self, outcome: &ConversionOutcome) {
        self.ledger.apply_conversion(outcome);
    }

    fn end_of_tick(&mut self, view: &BookView) {
        self.ledger.apply_fines();
        self.ledger.update_memory(view);
        self.tick += 1;
    }

    fn set_order_id_base(&mut self, base: u64) {
        self.ledger.set_next_id(base);
    }
}
