//! Identifier types for engine entities
//!
//! Engine-assigned ids carry a short prefix and a 5-digit zero-padded
//! monotonic counter (`TC-00042`); the counters themselves live with the
//! order lifecycle, these types only own the formats. Execution and
//! message ids are opaque UUID strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Engine-assigned order identifier (`TC-NNNNN`)
///
/// Synthetic liquidity uses the same type with `SEED-B-*` / `SEED-A-*` ids,
/// so the book index does not care where an entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint the id for the `seq`-th order accepted by the engine
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("TC-{seq:05}"))
    }

    /// Synthetic seed-order id for one side of one seeded level
    pub fn seeded(side_tag: char, symbol: &str, level: usize) -> Self {
        Self(format!("SEED-{side_tag}-{symbol}-{level}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-fill identifier (`F-NNNNN`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FillId(String);

impl FillId {
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("F-{seq:05}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Booked-trade identifier (`T-NNNNN`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(String);

impl TradeId {
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("T-{seq:05}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque execution/message identifier (UUID v7, time-sortable)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecId(String);

impl ExecId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
