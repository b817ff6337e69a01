//! Trade representation

use std::fmt;

use crate::types::{OrderId, Price, Size, Symbol, Timestamp};
use crate::Side;

/// A completed trade between an aggressor and a resting order.
///
/// The execution price is always the resting order's price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trade {
    pub ticker: Symbol,
    /// Execution price (the resting order's price)
    pub price: Price,
    pub size: Size,
    /// Order that initiated the trade (taker)
    pub agg_order_id: OrderId,
    /// Order that was resting on the book (maker)
    pub rest_order_id: OrderId,
    /// Side of the aggressor order
    pub agg_side: Side,
    pub agg_bot: Symbol,
    pub rest_bot: Symbol,
    /// Tick in which the trade occurred
    pub loop_num: u64,
    /// Engine-local monotonic event counter
    pub timestamp: Timestamp,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: Symbol,
        price: Price,
        size: Size,
        agg_order_id: OrderId,
        rest_order_id: OrderId,
        agg_side: Side,
        agg_bot: Symbol,
        rest_bot: Symbol,
        loop_num: u64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            ticker,
            price,
            size,
            agg_order_id,
            rest_order_id,
            agg_side,
            agg_bot,
            rest_bot,
            loop_num,
            timestamp,
        }
    }

    /// Side of the resting (maker) order.
    #[inline]
    pub fn rest_side(&self) -> Side {
        self.agg_side.opposite()
    }

    /// Cash value of the trade (price × size).
    #[inline]
    pub fn notional(&self) -> f64 {
        self.price.to_f64() * self.size as f64
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} traded {} at {} ({} {} vs {})",
            self.ticker, self.size, self.price, self.agg_bot, self.agg_side, self.rest_bot
        )
    }
}
