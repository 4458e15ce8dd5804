//! Structured lifecycle events
//!
//! The engine emits these as orders move through their states; observers
//! (the metrics collector, today) count them without reaching into engine
//! state. Fill events carry the leaves quantity after the fill so a sink
//! can tell a completed order from a partial one. Sinks must tolerate
//! being called from the engine task only.

use rust_decimal::Decimal;
use serde::Serialize;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};

#[derive(Debug, Clone, Serialize)]
pub enum EngineEvent {
    /// A new-order request reached the lifecycle, whatever becomes of it
    OrderReceived,
    OrderAccepted {
        order_id: OrderId,
    },
    OrderFilled {
        order_id: OrderId,
        quantity: Quantity,
        price: Price,
        /// Unfilled remainder after this fill; zero on the terminal fill
        leaves: Decimal,
    },
    OrderRejected {
        reason: String,
    },
    OrderCancelled {
        order_id: OrderId,
    },
}

pub trait EventSink: Send + Sync {
    fn record(&self, event: &EngineEvent);
}

/// Sink that drops everything; handy in tests
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &EngineEvent) {}
}
