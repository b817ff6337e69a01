//! BookSide: one side of a product's book (all bids or all asks).
//!
//! Levels live in a single `BTreeMap` keyed by *negated aggressiveness*,
//! `-side.sign() * price`: bids are stored under `-price`, asks under
//! `price`. Ascending key order is therefore most-aggressive-first on both
//! sides, so the top of book is simply the map's first entry and every walk
//! is a plain forward iteration. No per-side reversal, no cached best.

use std::collections::BTreeMap;

use crate::level::Level;
use crate::order::Rest;
use crate::types::{OrderId, Price, Size};
use crate::Side;

#[derive(Clone, Debug)]
pub struct BookSide {
    /// Levels keyed by negated aggressiveness; first entry = top of book.
    levels: BTreeMap<i64, Level>,
    side: Side,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            levels: BTreeMap::new(),
            side,
        }
    }

    /// Map key for a price on this side.
    #[inline]
    fn key(&self, price: Price) -> i64 {
        -self.side.sign() * price.0
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Best price (highest for bids, lowest for asks).
    pub fn best_price(&self) -> Option<Price> {
        self.levels.first_key_value().map(|(_, level)| level.price())
    }

    pub fn best_level_mut(&mut self) -> Option<&mut Level> {
        self.levels.first_entry().map(|entry| entry.into_mut())
    }

    /// Queue a rest at its price, creating the level if needed.
    pub fn insert_rest(&mut self, rest: Rest) {
        let key = self.key(rest.price);
        self.levels
            .entry(key)
            .or_insert_with(|| Level::new(rest.price))
            .push_back(rest);
    }

    /// Remove a specific rest. Returns its remaining size if found.
    /// Drops the level when it empties.
    pub fn remove_rest(&mut self, price: Price, order_id: OrderId) -> Option<Size> {
        let key = self.key(price);
        let level = self.levels.get_mut(&key)?;
        let removed = level.remove(order_id);
        let now_empty = level.is_empty();
        if removed.is_some() && now_empty {
            self.levels.remove(&key);
        }
        removed
    }

    /// Remove a price level entirely.
    pub fn remove_level(&mut self, price: Price) {
        let key = self.key(price);
        self.levels.remove(&key);
    }

    /// Levels from best to worst. The key encoding makes this the map's
    /// natural order on both sides.
    pub fn levels_best_to_worst(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    /// All rests in priority order: best price first, FIFO within a price.
    pub fn rests_best_to_worst(&self) -> impl Iterator<Item = &Rest> {
        self.levels.values().flat_map(Level::iter)
    }

    /// Total size across all levels.
    pub fn total_size(&self) -> Size {
        self.levels.values().map(Level::total_size).sum()
    }
}
