//! Ledger: the accounting core shared by every agent.
//!
//! Tracks positions, cash, outstanding order ids, and a last-known-mid
//! memory used to estimate fair value when a book goes one-sided or empty.
//! Strategy code composes a `Ledger` rather than inheriting from anything.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::message::{ConversionOutcome, Message};
use crate::order::Order;
use crate::product::{Product, ProductCatalog};
use crate::record::{BookView, RestView};
use crate::types::{OrderId, Position, Price, Size, Symbol};
use crate::Side;

/// Starting fair-value guess before any two-sided book has been observed.
pub const DEFAULT_MID: f64 = 1000.0;

/// Rounding direction for [`round_to_mpv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundMode {
    Nearest,
    Up,
    Down,
}

/// Quantize a decimal price to a whole number of MPV steps.
///
/// The input is first snapped to the 1e-4 price grid, so representation
/// noise in the incoming float cannot move the result by a step.
pub fn round_to_mpv(price: f64, mpv: Price, mode: RoundMode) -> Price {
    let units = (price * Price::SCALE as f64).round();
    let ratio = units / mpv.0 as f64;
    let steps = match mode {
        RoundMode::Nearest => ratio.round_ties_even(),
        RoundMode::Up => ratio.ceil(),
        RoundMode::Down => ratio.floor(),
    };
    Price(steps as i64 * mpv.0)
}

/// Per-agent position, cash, and order bookkeeping.
#[derive(Clone, Debug)]
pub struct Ledger {
    name: Symbol,
    cash: f64,
    positions: FxHashMap<Symbol, Position>,
    /// Outstanding order ids per ticker, for cancellation.
    sent_orders: FxHashMap<Symbol, Vec<OrderId>>,
    next_id: u64,
    last_mids: FxHashMap<Symbol, f64>,
    products: FxHashMap<Symbol, Product>,
    /// Catalog order, kept for deterministic iteration.
    tickers: Vec<Symbol>,
}

impl Ledger {
    pub fn new(name: Symbol, catalog: &ProductCatalog) -> Self {
        let mut positions = FxHashMap::default();
        let mut sent_orders = FxHashMap::default();
        let mut last_mids = FxHashMap::default();
        let mut products = FxHashMap::default();
        let mut tickers = Vec::with_capacity(catalog.len());
        for product in catalog.iter() {
            positions.insert(product.ticker, 0);
            sent_orders.insert(product.ticker, Vec::new());
            last_mids.insert(product.ticker, DEFAULT_MID);
            products.insert(product.ticker, product.clone());
            tickers.push(product.ticker);
        }
        Self {
            name,
            cash: 0.0,
            positions,
            sent_orders,
            next_id: 0,
            last_mids,
            products,
            tickers,
        }
    }

    // === Queries ===

    #[inline]
    pub fn name(&self) -> Symbol {
        self.name
    }

    #[inline]
    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self, ticker: Symbol) -> Position {
        self.positions.get(&ticker).copied().unwrap_or(0)
    }

    pub fn last_mid(&self, ticker: Symbol) -> f64 {
        self.last_mids.get(&ticker).copied().unwrap_or(DEFAULT_MID)
    }

    /// Outstanding order ids for a ticker, oldest first.
    pub fn outstanding(&self, ticker: Symbol) -> &[OrderId] {
        self.sent_orders.get(&ticker).map_or(&[], Vec::as_slice)
    }

    pub fn mpv(&self, ticker: Symbol) -> Option<Price> {
        self.products.get(&ticker).map(|p| p.mpv)
    }

    /// (ticker, position) pairs in catalog order.
    pub fn position_row(&self) -> Vec<(Symbol, Position)> {
        self.tickers
            .iter()
            .map(|t| (*t, self.position(*t)))
            .collect()
    }

    /// (ticker, estimated mid) pairs in catalog order.
    pub fn mid_row(&self, view: &BookView) -> Vec<(Symbol, f64)> {
        self.tickers
            .iter()
            .map(|t| (*t, self.mid_price(view, *t, 1)))
            .collect()
    }

    // === Order management ===

    /// Re-base the order id counter (the game loop hands each agent a
    /// disjoint block so ids never collide across agents).
    pub fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }

    /// Build an ORDER message with a fresh id and track it for cancellation.
    ///
    /// Fails with [`Error::InvalidOrder`] if the price is not an MPV
    /// multiple inside the product's bounds, or the size is zero.
    pub fn create_order(
        &mut self,
        ticker: Symbol,
        price: Price,
        size: Size,
        side: Side,
    ) -> Result<Message> {
        let product = self
            .products
            .get(&ticker)
            .ok_or(Error::UnknownTicker(ticker))?;
        if !product.accepts_price(price) {
            return Err(Error::InvalidOrder(format!(
                "price {price} is off-tick or out of bounds for {ticker}"
            )));
        }
        let order = Order::new(ticker, price, size, OrderId(self.next_id), side, self.name)?;
        self.next_id += 1;
        self.sent_orders
            .entry(ticker)
            .or_default()
            .push(order.order_id);
        Ok(Message::Order(order))
    }

    /// Build a REMOVE message and stop tracking the id.
    ///
    /// Untracked ids are a no-op; the engine will report the miss.
    pub fn cancel_order(&mut self, ticker: Symbol, order_id: OrderId) -> Message {
        if let Some(ids) = self.sent_orders.get_mut(&ticker) {
            ids.retain(|id| *id != order_id);
        }
        Message::Remove(order_id)
    }

    /// REMOVE messages for every outstanding id, ticker by ticker in
    /// catalog order. Iterates over a copy so tracking mutates safely.
    pub fn cancel_all(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        for ticker in self.tickers.clone() {
            let ids: Vec<OrderId> = self
                .sent_orders
                .get(&ticker)
                .map(|v| v.clone())
                .unwrap_or_default();
            for id in ids {
                messages.push(self.cancel_order(ticker, id));
            }
        }
        messages
    }

    /// Build a CONVERSION message for a composite product.
    pub fn conversion(&self, ticker: Symbol, size: Size, side: Side) -> Message {
        Message::Conversion(crate::message::ConversionRequest {
            ticker,
            size,
            side,
            bot: self.name,
        })
    }

    // === Accounting ===

    /// Fold a tick's trades into positions and cash.
    ///
    /// Only trades naming this ledger's owner count. Aggressing buys add
    /// inventory and spend cash; resting against a buy does the opposite.
    /// Configured product fees debit cash on every own trade.
    pub fn apply_trades(&mut self, trades: &[crate::trade::Trade]) {
        for trade in trades {
            if trade.agg_bot == self.name {
                self.book_fill(trade, trade.agg_side);
            }
            if trade.rest_bot == self.name {
                self.book_fill(trade, trade.agg_side.opposite());
            }
        }
    }

    fn book_fill(&mut self, trade: &crate::trade::Trade, own_side: Side) {
        let notional = trade.notional();
        let position = self.positions.entry(trade.ticker).or_insert(0);
        match own_side {
            Side::Buy => {
                *position += trade.size as i64;
                self.cash -= notional;
            }
            Side::Sell => {
                *position -= trade.size as i64;
                self.cash += notional;
            }
        }
        if let Some(fee) = self.products.get(&trade.ticker).and_then(|p| p.fee) {
            self.cash -= fee.amount(trade.price.to_f64(), trade.size);
        }
    }

    /// Apply the position-limit fine for every ticker over its limit.
    /// Call once per tick.
    pub fn apply_fines(&mut self) {
        let mut penalty = 0.0;
        for ticker in &self.tickers {
            let Some(product) = self.products.get(ticker) else {
                continue;
            };
            let Some(limit) = product.pos_limit else {
                continue;
            };
            let position = self.positions.get(ticker).copied().unwrap_or(0);
            let overrun = position.unsigned_abs().saturating_sub(limit);
            if overrun > 0 {
                penalty += product.fine * overrun as f64;
            }
        }
        self.cash -= penalty;
    }

    /// Apply a conversion's position changes and debit its fee.
    pub fn apply_conversion(&mut self, outcome: &ConversionOutcome) {
        for (ticker, change) in &outcome.pos_changes {
            *self.positions.entry(*ticker).or_insert(0) += change;
        }
        self.cash -= outcome.fee;
    }

    // === Fair-value estimation ===

    /// Best guess at a ticker's mid price.
    ///
    /// With both sides present, walks up to `weights` units from each head
    /// and averages the size-weighted bid and ask prices. A one-sided book
    /// bounds the true mid, so the last known mid is clamped against the
    /// surviving side; an empty book returns the last known mid.
    pub fn mid_price(&self, view: &BookView, ticker: Symbol, weights: Size) -> f64 {
        let last = self.last_mid(ticker);
        let Some(tv) = view.ticker(ticker) else {
            return last;
        };
        match (tv.bids.first(), tv.asks.first()) {
            (None, None) => last,
            (Some(best_bid), None) => last.min(best_bid.price.to_f64()),
            (None, Some(best_ask)) => last.max(best_ask.price.to_f64()),
            (Some(_), Some(_)) => {
                let weights = weights.max(1);
                let bid = weighted_head_price(&tv.bids, weights);
                let ask = weighted_head_price(&tv.asks, weights);
                (bid + ask) / 2.0
            }
        }
    }

    /// Refresh `last_mids` from every ticker showing a two-sided book.
    pub fn update_memory(&mut self, view: &BookView) {
        let mut updates = Vec::new();
        for tv in view.iter() {
            if !tv.bids.is_empty() && !tv.asks.is_empty() {
                updates.push((tv.ticker, self.mid_price(view, tv.ticker, 1)));
            }
        }
        for (ticker, mid) in updates {
            self.last_mids.insert(ticker, mid);
        }
    }

    /// Mark-to-market value: cash plus every position at its estimated mid.
    pub fn pnl(&self, view: &BookView) -> f64 {
        let mut total = self.cash;
        for ticker in &self.tickers {
            let position = self.positions.get(ticker).copied().unwrap_or(0);
            if position != 0 {
                total += position as f64 * self.mid_price(view, *ticker, 1);
            }
        }
        total
    }
}

/// Size-weighted average price over the first `weights` units of one side.
fn weighted_head_price(rests: &[RestView], weights: Size) -> f64 {
    let mut taken: Size = 0;
    let mut weighted = 0.0;
    for rest in rests {
        if taken >= weights {
            break;
        }
        let take = rest.size.min(weights - taken);
        weighted += rest.price.to_f64() * take as f64;
        taken += take;
    }
    if taken > 0 { weighted / taken as f64 } else { 0.0 }
}
