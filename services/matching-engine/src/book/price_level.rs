//! Price level with a FIFO queue of resting entries
//!
//! All entries at a level share its price; time priority within the level
//! is insertion order, tracked by the book-wide sequence number.

use std::collections::VecDeque;

use types::ids::OrderId;
use types::numeric::{Price, Quantity};

use super::Fill;

/// One resting order inside a price level queue
///
/// Invariant: `0 < remaining_quantity <= original_quantity`.
#[derive(Debug, Clone)]
pub struct BookEntry {
    pub order_id: OrderId,
    pub cl_ord_id: String,
    pub price: Price,
    pub remaining_quantity: Quantity,
    pub original_quantity: Quantity,
    pub sequence: u64,
}

#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<BookEntry>,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Append at the back of the queue (lowest time priority)
    pub fn push_back(&mut self, entry: BookEntry) {
        debug_assert_eq!(entry.price, self.price, "entry price off its level");
        self.orders.push_back(entry);
    }

    /// Remove one entry by id, wherever it sits in the queue
    pub fn remove(&mut self, order_id: &OrderId) -> Option<BookEntry> {
        let at = self.orders.iter().position(|e| &e.order_id == order_id)?;
        self.orders.remove(at)
    }

    /// Consume up to `qty` from the front of the queue.
    ///
    /// Appends one fill per touched entry to `fills`, in consumption order.
    /// A partially consumed entry has its remaining quantity reduced in
    /// place and stays at the front; fully consumed entries are popped and
    /// their ids pushed to `removed`. Returns the quantity consumed.
    pub fn consume(
        &mut self,
        qty: Quantity,
        fills: &mut Vec<Fill>,
        removed: &mut Vec<OrderId>,
    ) -> Quantity {
        let mut remaining = qty;

        while !remaining.is_zero() {
            let Some(front) = self.orders.front_mut() else {
                break;
            };
            let take = remaining.min(front.remaining_quantity);

            fills.push(Fill {
                order_id: front.order_id.clone(),
                cl_ord_id: front.cl_ord_id.clone(),
                price: self.price,
                quantity: take,
            });
            remaining = remaining - take;

            if take == front.remaining_quantity {
                removed.push(front.order_id.clone());
                self.orders.pop_front();
            } else {
                front.remaining_quantity = front.remaining_quantity - take;
            }
        }

        qty - remaining
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.orders
            .iter()
            .fold(Quantity::zero(), |acc, e| acc + e.remaining_quantity)
    }
}
