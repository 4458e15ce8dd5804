//! Two-sided order book for one symbol
//!
//! Bids match highest price first, asks lowest first, FIFO within a level.
//! An order index maps resting ids to their (side, price) for O(1) cancel;
//! the index holds an id exactly while the entry sits in one price level.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

use std::collections::HashMap;

use serde::Serialize;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Side;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::{BookEntry, PriceLevel};

/// One consumed slice of a resting entry
#[derive(Debug, Clone)]
pub struct Fill {
    pub order_id: OrderId,
    pub cl_ord_id: String,
    pub price: Price,
    pub quantity: Quantity,
}

/// Aggregated view of one price level for depth queries
#[derive(Debug, Clone, Serialize)]
pub struct DepthLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    bids: BidBook,
    asks: AskBook,
    /// order_id -> (side, price); the cancel fast path
    index: HashMap<OrderId, (Side, Price)>,
    sequence: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rest an entry at the tail of its price level's queue.
    ///
    /// The book assigns the next sequence number; whatever the caller put
    /// there is overwritten. Buy entries rest on the bid side, sells on
    /// the ask side.
    pub fn add(&mut self, side: Side, mut entry: BookEntry) {
        self.sequence += 1;
        entry.sequence = self.sequence;
        self.index
            .insert(entry.order_id.clone(), (side, entry.price));
        match side {
            Side::Buy => self.bids.insert(entry),
            Side::Sell => self.asks.insert(entry),
        }
    }

    /// Cancel by id. False when the id is not resting.
    pub fn cancel(&mut self, order_id: &OrderId) -> bool {
        let Some((side, price)) = self.index.remove(order_id) else {
            return false;
        };
        let removed = match side {
            Side::Buy => self.bids.remove(order_id, price),
            Side::Sell => self.asks.remove(order_id, price),
        };
        debug_assert!(removed.is_some(), "index pointed at a missing entry");
        removed.is_some()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Best level of one side with its aggregate quantity
    pub fn best_level(&self, side: Side) -> Option<(Price, Quantity)> {
        match side {
            Side::Buy => self.bids.best(),
            Side::Sell => self.asks.best(),
        }
    }

    /// Top `n` levels of one side, best price first
    pub fn depth(&self, side: Side, n: usize) -> Vec<DepthLevel> {
        match side {
            Side::Buy => self.bids.depth(n),
            Side::Sell => self.asks.depth(n),
        }
    }

    /// Consume up to `qty` from the bid side, best price outward.
    ///
    /// `qty` of zero returns nothing and touches nothing; `qty` beyond the
    /// side's total drains the side and returns what was there.
    pub fn consume_bids(&mut self, qty: Quantity) -> Vec<Fill> {
        if qty.is_zero() {
            return Vec::new();
        }
        let mut fills = Vec::new();
        let mut removed = Vec::new();
        self.bids.consume(qty, &mut fills, &mut removed);
        for order_id in removed {
            self.index.remove(&order_id);
        }
        fills
    }

    /// Consume up to `qty` from the ask side, best price outward
    pub fn consume_asks(&mut self, qty: Quantity) -> Vec<Fill> {
        if qty.is_zero() {
            return Vec::new();
        }
        let mut fills = Vec::new();
        let mut removed = Vec::new();
        self.asks.consume(qty, &mut fills, &mut removed);
        for order_id in removed {
            self.index.remove(&order_id);
        }
        fills
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.level_count()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.level_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(id: u64, price: rust_decimal::Decimal, qty: rust_decimal::Decimal) -> BookEntry {
        BookEntry {
            order_id: OrderId::from_sequence(id),
            cl_ord_id: format!("cli-{id}"),
            price: Price::new(price),
            remaining_quantity: Quantity::new(qty),
            original_quantity: Quantity::new(qty),
            sequence: 0,
        }
    }

    #[test]
    fn sequence_is_assigned_per_insertion() {
        let mut book = OrderBook::new();
        book.add(Side::Buy, entry(1, dec!(100), dec!(10)));
        book.add(Side::Sell, entry(2, dec!(101), dec!(10)));

        // Both sides share one counter, FIFO ties break by insertion
        book.add(Side::Buy, entry(3, dec!(100), dec!(10)));
        let fills = book.consume_bids(Quantity::new(dec!(15)));
        assert_eq!(fills[0].order_id, OrderId::from_sequence(1));
        assert_eq!(fills[1].order_id, OrderId::from_sequence(3));
    }

    #[test]
    fn cancel_unknown_id_is_false() {
        let mut book = OrderBook::new();
        assert!(!book.cancel(&OrderId::from_sequence(9)));
    }

    #[test]
    fn cancelled_entry_never_fills() {
        let mut book = OrderBook::new();
        book.add(Side::Sell, entry(1, dec!(100), dec!(10)));
        book.add(Side::Sell, entry(2, dec!(100), dec!(10)));

        assert!(book.cancel(&OrderId::from_sequence(1)));
        assert!(!book.cancel(&OrderId::from_sequence(1)));

        let fills = book.consume_asks(Quantity::new(dec!(20)));
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].order_id, OrderId::from_sequence(2));
    }

    #[test]
    fn fully_consumed_ids_leave_the_index() {
        let mut book = OrderBook::new();
        book.add(Side::Buy, entry(1, dec!(100), dec!(10)));

        let fills = book.consume_bids(Quantity::new(dec!(10)));
        assert_eq!(fills.len(), 1);
        // Gone from the book entirely: cancel no longer finds it
        assert!(!book.cancel(&OrderId::from_sequence(1)));
        assert_eq!(book.bid_levels(), 0);
    }

    #[test]
    fn partially_consumed_entry_stays_cancellable() {
        let mut book = OrderBook::new();
        book.add(Side::Buy, entry(1, dec!(100), dec!(10)));

        let fills = book.consume_bids(Quantity::new(dec!(4)));
        assert_eq!(fills[0].quantity.as_decimal(), dec!(4));
        assert!(book.cancel(&OrderId::from_sequence(1)));
        assert_eq!(book.bid_levels(), 0);
    }

    #[test]
    fn oversized_consume_drains_without_error() {
        let mut book = OrderBook::new();
        book.add(Side::Sell, entry(1, dec!(100), dec!(10)));
        book.add(Side::Sell, entry(2, dec!(101), dec!(10)));

        let fills = book.consume_asks(Quantity::new(dec!(500)));
        assert_eq!(fills.len(), 2);
        assert_eq!(book.ask_levels(), 0);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn depth_aggregates_per_level() {
        let mut book = OrderBook::new();
        book.add(Side::Buy, entry(1, dec!(100), dec!(10)));
        book.add(Side::Buy, entry(2, dec!(100), dec!(15)));
        book.add(Side::Buy, entry(3, dec!(99), dec!(5)));

        let depth = book.depth(Side::Buy, 5);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].price.as_decimal(), dec!(100));
        assert_eq!(depth[0].quantity.as_decimal(), dec!(25));
        assert_eq!(depth[0].order_count, 2);
    }
}
