//! Gateway-level failures
//!
//! These are transport and bootstrap errors. Request-level problems never
//! become a `GatewayError`; they turn into reject envelopes and the engine
//! keeps going.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {0} bytes exceeds the maximum length")]
    FrameTooLarge(usize),

    #[error("envelope codec error: {0}")]
    Codec(#[from] bincode::Error),
}
