//! Engine: the multi-product matching core.
//!
//! One [`Book`] per catalog product, plus a run-wide order id index used for
//! duplicate detection and O(1) cancel dispatch. Every accepted submit
//! reserves its id for the rest of the run; ids are never recycled.

use rustc_hash::FxHashMap;

use crate::book::Book;
use crate::error::{Error, Result};
use crate::message::{ConversionOutcome, ConversionRequest};
use crate::order::{Order, Rest};
use crate::product::ProductCatalog;
use crate::trade::Trade;
use crate::types::{OrderId, Price, Symbol, Timestamp};
use crate::Side;

/// Where a known order id currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OrderLocation {
    /// Resting on a book; fields pin down the level for cancel dispatch.
    Resting {
        ticker: Symbol,
        side: Side,
        price: Price,
    },
    /// Fully filled or cancelled. Terminal; the id stays reserved.
    Done,
}

/// The matching engine for all products of a run.
pub struct Engine {
    catalog: ProductCatalog,
    books: FxHashMap<Symbol, Book>,
    seen: FxHashMap<OrderId, OrderLocation>,
    next_timestamp: Timestamp,
    removal_warnings: bool,
}

impl Engine {
    /// Create an engine with one empty book per catalog product.
    /// Cancel misses are silent.
    pub fn new(catalog: ProductCatalog) -> Self {
        let books = catalog.iter().map(|p| (p.ticker, Book::new())).collect();
        Self {
            catalog,
            books,
            seen: FxHashMap::default(),
            next_timestamp: 1,
            removal_warnings: false,
        }
    }

    /// Like [`Engine::new`], but cancels of unknown or dead ids emit a
    /// warning through the `log` facade.
    pub fn with_removal_warnings(catalog: ProductCatalog) -> Self {
        let mut engine = Self::new(catalog);
        engine.removal_warnings = true;
        engine
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Submit an order, returning the trades it produced.
    ///
    /// Matches against the opposite side under price-time priority; any
    /// unfilled residual rests on the order's own side. Fails with
    /// [`Error::DuplicateOrderId`] or [`Error::UnknownTicker`], leaving the
    /// book untouched.
    pub fn submit(&mut self, mut order: Order, loop_num: u64) -> Result<Vec<Trade>> {
        if self.seen.contains_key(&order.order_id) {
            return Err(Error::DuplicateOrderId(order.order_id));
        }
        let Some(book) = self.books.get_mut(&order.ticker) else {
            return Err(Error::UnknownTicker(order.ticker));
        };

        let fills = book.match_order(&mut order);

        if order.size > 0 {
            book.add_rest(order.side, Rest::from_order(&order));
            self.seen.insert(
                order.order_id,
                OrderLocation::Resting {
                    ticker: order.ticker,
                    side: order.side,
                    price: order.price,
                },
            );
        } else {
            self.seen.insert(order.order_id, OrderLocation::Done);
        }

        let mut trades = Vec::with_capacity(fills.len());
        for fill in fills {
            if fill.rest_done {
                self.seen.insert(fill.rest_order_id, OrderLocation::Done);
            }
            let timestamp = self.next_timestamp;
            self.next_timestamp += 1;
            trades.push(Trade::new(
                order.ticker,
                fill.price,
                fill.size,
                order.order_id,
                fill.rest_order_id,
                order.side,
                order.bot,
                fill.rest_bot,
                loop_num,
                timestamp,
            ));
        }
        Ok(trades)
    }

    /// Cancel a resting order.
    ///
    /// Returns `true` iff a live rest was removed. Unknown or already-dead
    /// ids return `false`; with removal warnings enabled, a warning is
    /// logged.
    pub fn cancel(&mut self, order_id: OrderId) -> bool {
        match self.seen.get(&order_id).copied() {
            Some(OrderLocation::Resting {
                ticker,
                side,
                price,
            }) => {
                let removed = self
                    .books
                    .get_mut(&ticker)
                    .and_then(|book| book.side_mut(side).remove_rest(price, order_id))
                    .is_some();
                if removed {
                    self.seen.insert(order_id, OrderLocation::Done);
                } else if self.removal_warnings {
                    log::warn!("order {order_id} indexed but not found on the {ticker} book");
                }
                removed
            }
            Some(OrderLocation::Done) => {
                if self.removal_warnings {
                    log::warn!("order {order_id} already filled or cancelled");
                }
                false
            }
            None => {
                if self.removal_warnings {
                    log::warn!("order {order_id} was never submitted");
                }
                false
            }
        }
    }

    /// Work out the position adjustments for a conversion request.
    ///
    /// Buying the composite credits it and debits `size × multiplicity` of
    /// each constituent; selling is the inverse. The book is not involved;
    /// the caller applies the outcome to the requesting agent only.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutcome> {
        let product = self
            .catalog
            .get(request.ticker)
            .ok_or(Error::UnknownTicker(request.ticker))?;
        let conversion = product
            .conversion
            .as_ref()
            .ok_or(Error::NotConvertible(request.ticker))?;
        if request.size == 0 {
            return Err(Error::InvalidOrder(format!(
                "{} requested a zero-size conversion of {}",
                request.bot, request.ticker
            )));
        }

        let sign = request.side.sign();
        let mut pos_changes = Vec::with_capacity(conversion.components.len() + 1);
        pos_changes.push((request.ticker, sign * request.size as i64));
        for (component, mult) in &conversion.components {
            pos_changes.push((*component, -sign * (request.size * mult) as i64));
        }

        Ok(ConversionOutcome {
            bot: request.bot,
            pos_changes,
            fee: conversion.fee * request.size as f64,
        })
    }

    /// Best bid price for a ticker, if any.
    pub fn best_bid(&self, ticker: Symbol) -> Option<Price> {
        self.books.get(&ticker)?.bids().best_price()
    }

    /// Best ask price for a ticker, if any.
    pub fn best_ask(&self, ticker: Symbol) -> Option<Price> {
        self.books.get(&ticker)?.asks().best_price()
    }

    pub(crate) fn book(&self, ticker: Symbol) -> Option<&Book> {
        self.books.get(&ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use crate::types::Size;

    fn engine() -> Engine {
        let catalog = ProductCatalog::new(vec![
            Product::new("UEC", 0.1),
            Product::new("ETF", 0.1).with_conversion(&[("UEC", 2)], 1.0),
        ])
        .unwrap();
        Engine::new(catalog)
    }

    fn order(price: f64, size: Size, id: u64, side: Side, bot: &str) -> Order {
        Order::new(
            Symbol::new("UEC"),
            Price::from_f64(price),
            size,
            OrderId(id),
            side,
            Symbol::new(bot),
        )
        .unwrap()
    }

    #[test]
    fn submit_rests_when_no_cross() {
        let mut engine = engine();
        let trades = engine.submit(order(100.0, 5, 1, Side::Buy, "botA"), 0).unwrap();
        assert!(trades.is_empty());
        assert_eq!(engine.best_bid(Symbol::new("UEC")), Some(Price::from_f64(100.0)));
    }

    #[test]
    fn submit_trades_at_resting_price() {
        let mut engine = engine();
        engine.submit(order(100.0, 5, 1, Side::Sell, "botA"), 0).unwrap();
        let trades = engine.submit(order(100.5, 3, 2, Side::Buy, "botB"), 0).unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Price::from_f64(100.0));
        assert_eq!(trades[0].size, 3);
        assert_eq!(trades[0].agg_bot, Symbol::new("botB"));
        assert_eq!(trades[0].rest_bot, Symbol::new("botA"));
    }

    #[test]
    fn duplicate_id_rejected_without_state_change() {
        let mut engine = engine();
        engine.submit(order(100.0, 5, 1, Side::Buy, "botA"), 0).unwrap();

        let err = engine.submit(order(99.0, 3, 1, Side::Buy, "botA"), 0).unwrap_err();
        assert!(matches!(err, Error::DuplicateOrderId(OrderId(1))));
        assert_eq!(engine.best_bid(Symbol::new("UEC")), Some(Price::from_f64(100.0)));
    }

    #[test]
    fn fully_filled_aggressor_id_is_reserved() {
        let mut engine = engine();
        engine.submit(order(100.0, 5, 1, Side::Sell, "botA"), 0).unwrap();
        engine.submit(order(100.0, 5, 2, Side::Buy, "botB"), 0).unwrap();

        // id 2 never rested, but it is spent
        let err = engine.submit(order(100.0, 5, 2, Side::Buy, "botB"), 0).unwrap_err();
        assert!(matches!(err, Error::DuplicateOrderId(OrderId(2))));
    }

    #[test]
    fn unknown_ticker_rejected() {
        let mut engine = engine();
        let bad = Order::new(
            Symbol::new("NOPE"),
            Price::from_f64(100.0),
            5,
            OrderId(1),
            Side::Buy,
            Symbol::new("botA"),
        )
        .unwrap();
        let err = engine.submit(bad, 0).unwrap_err();
        assert!(matches!(err, Error::UnknownTicker(_)));
        // A failed submit does not reserve the id.
        assert!(engine.submit(order(100.0, 5, 1, Side::Buy, "botA"), 0).is_ok());
    }

    #[test]
    fn cancel_returns_true_once() {
        let mut engine = engine();
        engine.submit(order(100.0, 5, 1, Side::Buy, "botA"), 0).unwrap();

        assert!(engine.cancel(OrderId(1)));
        assert!(!engine.cancel(OrderId(1)));
        assert_eq!(engine.best_bid(Symbol::new("UEC")), None);
    }

    #[test]
    fn cancel_unknown_is_false() {
        let mut engine = engine();
        assert!(!engine.cancel(OrderId(999)));
    }

    #[test]
    fn cancelled_id_stays_reserved() {
        let mut engine = engine();
        engine.submit(order(100.0, 5, 1, Side::Buy, "botA"), 0).unwrap();
        engine.cancel(OrderId(1));

        let err = engine.submit(order(100.0, 5, 1, Side::Buy, "botA"), 0).unwrap_err();
        assert!(matches!(err, Error::DuplicateOrderId(_)));
    }

    #[test]
    fn cancel_of_filled_rest_is_false() {
        let mut engine = engine();
        engine.submit(order(100.0, 5, 1, Side::Sell, "botA"), 0).unwrap();
        engine.submit(order(100.0, 5, 2, Side::Buy, "botB"), 0).unwrap();

        assert!(!engine.cancel(OrderId(1)));
    }

    #[test]
    fn trade_timestamps_are_monotonic() {
        let mut engine = engine();
        engine.submit(order(100.0, 2, 1, Side::Sell, "botA"), 0).unwrap();
        engine.submit(order(100.1, 2, 2, Side::Sell, "botA"), 0).unwrap();
        let trades = engine.submit(order(100.1, 4, 3, Side::Buy, "botB"), 0).unwrap();

        assert_eq!(trades.len(), 2);
        assert!(trades[0].timestamp < trades[1].timestamp);
    }

    #[test]
    fn convert_buy_decomposes() {
        let engine = engine();
        let outcome = engine
            .convert(&ConversionRequest {
                ticker: Symbol::new("ETF"),
                size: 3,
                side: Side::Buy,
                bot: Symbol::new("botA"),
            })
            .unwrap();

        assert_eq!(outcome.pos_changes, vec![
            (Symbol::new("ETF"), 3),
            (Symbol::new("UEC"), -6),
        ]);
        assert!((outcome.fee - 3.0).abs() < 1e-12);
    }

    #[test]
    fn convert_sell_recomposes() {
        let engine = engine();
        let outcome = engine
            .convert(&ConversionRequest {
                ticker: Symbol::new("ETF"),
                size: 2,
                side: Side::Sell,
                bot: Symbol::new("botA"),
            })
            .unwrap();

        assert_eq!(outcome.pos_changes, vec![
            (Symbol::new("ETF"), -2),
            (Symbol::new("UEC"), 4),
        ]);
    }

    #[test]
    fn convert_plain_product_fails() {
        let engine = engine();
        let err = engine
            .convert(&ConversionRequest {
                ticker: Symbol::new("UEC"),
                size: 1,
                side: Side::Buy,
                bot: Symbol::new("botA"),
            })
            .unwrap_err();
        assert!(matches!(err, Error::NotConvertible(_)));
    }
}
