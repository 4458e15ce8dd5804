//! Engine metrics
//!
//! Counters are atomic because the periodic reporter reads them from its
//! own task; everything else in the engine is single-owner. Notional is
//! accumulated in integer cents so it can stay lock-free.
//!
//! `orders_filled` counts orders that completed; `partial_fills` counts
//! fill events that left a remainder. The distinction comes from the
//! leaves quantity each fill event carries.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::events::{EngineEvent, EventSink};

#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub orders_received: AtomicU64,
    pub orders_filled: AtomicU64,
    pub partial_fills: AtomicU64,
    pub orders_rejected: AtomicU64,
    pub orders_cancelled: AtomicU64,
    pub messages_in: AtomicU64,
    pub messages_out: AtomicU64,
    notional_cents: AtomicU64,
    latency_us: Mutex<LatencyTracker>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_message_in(&self) {
        self.messages_in.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_out(&self) {
        self.messages_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Wall time spent processing one request, in microseconds
    pub fn record_latency_us(&self, micros: u64) {
        if let Ok(mut tracker) = self.latency_us.lock() {
            tracker.record(micros);
        }
    }

    pub fn total_notional(&self) -> Decimal {
        Decimal::from(self.notional_cents.load(Ordering::Relaxed)) / Decimal::from(100)
    }

    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert(
            "orders_received".to_string(),
            self.orders_received.load(Ordering::Relaxed),
        );
        m.insert(
            "orders_filled".to_string(),
            self.orders_filled.load(Ordering::Relaxed),
        );
        m.insert(
            "partial_fills".to_string(),
            self.partial_fills.load(Ordering::Relaxed),
        );
        m.insert(
            "orders_rejected".to_string(),
            self.orders_rejected.load(Ordering::Relaxed),
        );
        m.insert(
            "orders_cancelled".to_string(),
            self.orders_cancelled.load(Ordering::Relaxed),
        );
        m.insert(
            "messages_in".to_string(),
            self.messages_in.load(Ordering::Relaxed),
        );
        m.insert(
            "messages_out".to_string(),
            self.messages_out.load(Ordering::Relaxed),
        );
        m
    }

    /// One-line summary for the periodic reporter
    pub fn summary(&self) -> String {
        let (avg, p99, samples) = match self.latency_us.lock() {
            Ok(tracker) => (
                tracker.average().unwrap_or(0),
                tracker.percentile(99).unwrap_or(0),
                tracker.count(),
            ),
            Err(_) => (0, 0, 0),
        };
        format!(
            "orders_received={} orders_filled={} partial_fills={} orders_rejected={} \
             orders_cancelled={} messages_in={} messages_out={} total_notional={} \
             latency_avg_us={avg} latency_p99_us={p99} latency_samples={samples}",
            self.orders_received.load(Ordering::Relaxed),
            self.orders_filled.load(Ordering::Relaxed),
            self.partial_fills.load(Ordering::Relaxed),
            self.orders_rejected.load(Ordering::Relaxed),
            self.orders_cancelled.load(Ordering::Relaxed),
            self.messages_in.load(Ordering::Relaxed),
            self.messages_out.load(Ordering::Relaxed),
            self.total_notional(),
        )
    }
}

impl EventSink for EngineMetrics {
    fn record(&self, event: &EngineEvent) {
        match event {
            EngineEvent::OrderReceived => {
                self.orders_received.fetch_add(1, Ordering::Relaxed);
            }
            // Acceptance has no counter of its own: received minus the
            // outcome counters covers it
            EngineEvent::OrderAccepted { .. } => {}
            EngineEvent::OrderFilled {
                quantity,
                price,
                leaves,
                ..
            } => {
                if leaves.is_zero() {
                    self.orders_filled.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.partial_fills.fetch_add(1, Ordering::Relaxed);
                }
                let cents = (quantity.notional(*price) * Decimal::from(100))
                    .to_u64()
                    .unwrap_or(0);
                self.notional_cents.fetch_add(cents, Ordering::Relaxed);
            }
            EngineEvent::OrderRejected { .. } => {
                self.orders_rejected.fetch_add(1, Ordering::Relaxed);
            }
            EngineEvent::OrderCancelled { .. } => {
                self.orders_cancelled.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Bounded window of latency samples with percentile queries
#[derive(Debug)]
pub struct LatencyTracker {
    samples: Vec<u64>,
    max_samples: usize,
    next: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
            next: 0,
        }
    }

    /// Record one sample, overwriting the oldest once the window is full
    pub fn record(&mut self, value: u64) {
        if self.samples.len() < self.max_samples {
            self.samples.push(value);
        } else {
            self.samples[self.next] = value;
            self.next = (self.next + 1) % self.max_samples;
        }
    }

    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        let idx = (p as f64 / 100.0 * (sorted.len() - 1) as f64) as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    pub fn average(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<u64>() / self.samples.len() as u64)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new(10_000)
    }
}
