//! Error taxonomy
//!
//! Every variant here surfaces to the client as the text of a reject
//! envelope; none of them stop the engine. A malformed frame that fails to
//! decode never reaches this layer and gets no response at all.

use thiserror::Error;

/// Order-level failures raised by the lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("ClOrdID is required")]
    MissingClOrdId,

    #[error("Symbol is required")]
    MissingSymbol,

    #[error("OrderQty must be positive")]
    InvalidQuantity,

    #[error("Price must be positive for limit orders")]
    InvalidPrice,

    #[error("Could not match order: no market price available")]
    NoMatch,

    #[error("Unknown order: {cl_ord_id}")]
    UnknownOrder { cl_ord_id: String },

    #[error("Order {cl_ord_id} cannot be cancelled in status {status}")]
    NotCancelable { cl_ord_id: String, status: String },
}

/// Envelope-level failures raised while picking a request apart
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Message has no {expected} body")]
    WrongBody { expected: &'static str },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported message type")]
    Unsupported,
}
