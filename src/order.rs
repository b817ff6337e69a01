//! Order submission and book-residency records

use crate::error::{Error, Result};
use crate::types::{OrderId, Price, Size, Symbol};
use crate::Side;

/// A limit order on its way to the engine.
///
/// `size` is the remaining quantity; the matching loop decrements it as
/// fills occur, and whatever is left rests on the book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub ticker: Symbol,
    pub price: Price,
    pub size: Size,
    pub order_id: OrderId,
    pub side: Side,
    pub bot: Symbol,
}

impl Order {
    /// Create a new order.
    ///
    /// Fails with [`Error::InvalidOrder`] on zero size or negative price.
    pub fn new(
        ticker: Symbol,
        price: Price,
        size: Size,
        order_id: OrderId,
        side: Side,
        bot: Symbol,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidOrder(format!(
                "{bot} sent a zero-size order for {ticker}"
            )));
        }
        if price < Price::ZERO {
            return Err(Error::InvalidOrder(format!(
                "{bot} sent a negative price {price} for {ticker}"
            )));
        }
        Ok(Self {
            ticker,
            price,
            size,
            order_id,
            side,
            bot,
        })
    }

    /// Signed score making both sides comparable: price for bids, negated
    /// price for asks. Larger = more aggressive.
    #[inline]
    pub fn aggressiveness(&self) -> i64 {
        self.side.sign() * self.price.0
    }
}

/// A resting order inside a price level.
///
/// Ticker and side are implied by the book that holds it; `size` is the
/// unfilled remainder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rest {
    pub price: Price,
    pub size: Size,
    pub order_id: OrderId,
    pub bot: Symbol,
}

impl Rest {
    pub(crate) fn from_order(order: &Order) -> Self {
        Self {
            price: order.price,
            size: order.size,
            order_id: order.order_id,
            bot: order.bot,
        }
    }
}
