//! Book: both sides of one product, plus the matching loop.
//!
//! An incoming order grinds down the opposite side head-first: the most
//! aggressive rest goes first, arrival order breaks ties inside a price,
//! and every fill is priced off the rest. Whatever the order has left when
//! its limit stops reaching the book is handed back to the caller.

use crate::book_side::BookSide;
use crate::order::{Order, Rest};
use crate::types::{OrderId, Price, Size, Symbol};
use crate::Side;

/// One fill produced while matching an incoming order.
#[derive(Clone, Debug)]
pub(crate) struct Fill {
    pub price: Price,
    pub size: Size,
    pub rest_order_id: OrderId,
    pub rest_bot: Symbol,
    pub rest_done: bool,
}

/// The two sides of a single product's book.
#[derive(Clone, Debug)]
pub(crate) struct Book {
    bids: BookSide,
    asks: BookSide,
}

impl Book {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
        }
    }

    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Match an incoming order against the opposite side.
    ///
    /// Decrements `incoming.size` as fills occur and returns them in
    /// execution order. The residual (if any) is NOT inserted here — the
    /// caller decides, so a failed submit can leave the book untouched.
    pub fn match_order(&mut self, incoming: &mut Order) -> Vec<Fill> {
        let mut fills = Vec::new();

        while incoming.size > 0 {
            let opposite = self.side_mut(incoming.side.opposite());
            let best_price = match opposite.best_price() {
                Some(p) => p,
                None => break, // No liquidity
            };

            // Crossing test, one signed comparison for both sides: a buy
            // reaches asks priced at or under its limit, a sell reaches
            // bids at or over it. Integer price units make equality exact.
            if incoming.side.sign() * (incoming.price.0 - best_price.0) < 0 {
                break; // everything deeper is even further away
            }

            let (size, rest_order_id, rest_bot, rest_done, level_empty) = {
                let level = opposite
                    .best_level_mut()
                    .expect("invariant: cached best price has a level");
                let front_size = level
                    .front()
                    .expect("invariant: levels are never left empty")
                    .size;
                let size = incoming.size.min(front_size);
                let (id, bot, done) = level
                    .fill_front(size)
                    .expect("invariant: levels are never left empty");
                (size, id, bot, done, level.is_empty())
            };
            if level_empty {
                opposite.remove_level(best_price);
            }

            incoming.size -= size;
            fills.push(Fill {
                price: best_price,
                size,
                rest_order_id,
                rest_bot,
                rest_done,
            });
        }

        fills
    }

    /// Rest an unfilled residual on its own side.
    pub fn add_rest(&mut self, side: Side, rest: Rest) {
        self.side_mut(side).insert_rest(rest);
    }

    /// Best bid must stay strictly below best ask once matching is done.
    #[cfg(test)]
    pub fn is_crossed(&self) -> bool {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }
}
