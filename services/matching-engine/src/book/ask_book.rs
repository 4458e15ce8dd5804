//! Ask (sell-side) half of the book
//!
//! Mirror of the bid side: price levels in a BTreeMap, served lowest
//! price first.

use std::collections::BTreeMap;

use types::ids::OrderId;
use types::numeric::{Price, Quantity};

use super::price_level::{BookEntry, PriceLevel};
use super::{DepthLevel, Fill};

#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: BookEntry) {
        self.levels
            .entry(entry.price)
            .or_insert_with(|| PriceLevel::new(entry.price))
            .push_back(entry);
    }

    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> Option<BookEntry> {
        let level = self.levels.get_mut(&price)?;
        let entry = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(entry)
    }

    /// Best ask: the lowest price, with its aggregate quantity
    pub fn best(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Walk from the best ask outward consuming up to `qty`
    pub fn consume(
        &mut self,
        qty: Quantity,
        fills: &mut Vec<Fill>,
        removed: &mut Vec<OrderId>,
    ) -> Quantity {
        let mut remaining = qty;

        while !remaining.is_zero() {
            let (price, emptied, consumed) = {
                let Some((price, level)) = self.levels.iter_mut().next() else {
                    break;
                };
                let consumed = level.consume(remaining, fills, removed);
                (*price, level.is_empty(), consumed)
            };
            remaining = remaining - consumed;
            if emptied {
                self.levels.remove(&price);
            }
        }

        qty - remaining
    }

    /// Top `n` levels, best price first
    pub fn depth(&self, n: usize) -> Vec<DepthLevel> {
        self.levels
            .iter()
            .take(n)
            .map(|(price, level)| DepthLevel {
                price: *price,
                quantity: level.total_quantity(),
                order_count: level.order_count(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
