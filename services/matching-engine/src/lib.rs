//! Matching engine
//!
//! Per-symbol limit order books with price-time priority, market and
//! marketable-limit matching, and synthetic liquidity seeded around a
//! reference price.
//!
//! Invariants the engine maintains:
//! - Fills come back best price first, FIFO within a price level
//! - A limit order never trades beyond its limit price
//! - The book is never observably crossed: incoming orders cross before
//!   anything rests

pub mod book;
pub mod engine;

pub use book::{BookEntry, DepthLevel, Fill, OrderBook};
pub use engine::{FillEvent, MatchResult, MatchingEngine, SeedConfig};
