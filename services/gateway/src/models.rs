//! Wire model: the request/response envelope and its bodies
//!
//! FIX-aligned field names; the body is a tagged union the lifecycle
//! dispatches on. Quantities and prices arrive as raw decimals so that an
//! out-of-range value is a validation reject, not a dead connection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::instrument::Instrument;

/// CompID the engine stamps on every outbound message
pub const ENGINE_COMP_ID: &str = "TRADECORE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub sender_comp_id: String,
    pub target_comp_id: String,
    /// Opaque unique id; responses reference the request's via
    /// `Reject::ref_msg_seq_num`
    pub msg_seq_num: String,
    /// UTC `YYYYMMDD-HH:MM:SS.mmm`
    pub sending_time: String,
    pub body: Body,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Body {
    NewOrderSingle(NewOrderSingle),
    OrderCancelRequest(OrderCancelRequest),
    ExecutionReport(ExecutionReport),
    Reject(Reject),
    Heartbeat(Heartbeat),
    PositionRequest(PositionRequest),
    PositionReport(PositionReport),
}

impl Body {
    pub fn tag(&self) -> &'static str {
        match self {
            Body::NewOrderSingle(_) => "NewOrderSingle",
            Body::OrderCancelRequest(_) => "OrderCancelRequest",
            Body::ExecutionReport(_) => "ExecutionReport",
            Body::Reject(_) => "Reject",
            Body::Heartbeat(_) => "Heartbeat",
            Body::PositionRequest(_) => "PositionRequest",
            Body::PositionReport(_) => "PositionReport",
        }
    }
}

/// New order request. Side and type use FIX codes (buy=1/sell=2,
/// market=1/limit=2); time in force is a lowercase tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderSingle {
    pub cl_ord_id: String,
    pub instrument: Instrument,
    pub side: i32,
    pub order_qty: Decimal,
    pub ord_type: i32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub time_in_force: String,
    /// Strategy id, echoed into booked trades
    #[serde(default)]
    pub text: String,
    /// Reference-price hint for seeding; zero means absent
    #[serde(default)]
    pub market_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelRequest {
    pub cl_ord_id: String,
    pub orig_cl_ord_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecType {
    New,
    PartialFill,
    Fill,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub order_id: String,
    pub cl_ord_id: String,
    pub exec_id: String,
    pub exec_type: ExecType,
    pub ord_status: OrdStatus,
    pub instrument: Instrument,
    pub side: i32,
    pub order_qty: Decimal,
    pub last_px: Decimal,
    pub last_qty: Decimal,
    pub leaves_qty: Decimal,
    pub cum_qty: Decimal,
    pub avg_px: Decimal,
    pub commission: Decimal,
    pub transact_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reject {
    pub ref_msg_seq_num: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(default)]
    pub test_req_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionRequest {
    #[serde(default)]
    pub pos_req_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionReport {
    pub pos_rpt_id: String,
    pub positions: Vec<PositionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionEntry {
    pub instrument: Instrument,
    pub long_qty: Decimal,
    pub short_qty: Decimal,
    pub avg_price: Decimal,
    pub realized_pnl: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn body_tags_match_variant_names() {
        let body = Body::Heartbeat(Heartbeat::default());
        assert_eq!(body.tag(), "Heartbeat");
    }

    #[test]
    fn exec_type_uses_snake_case_tags() {
        assert_eq!(
            serde_json::to_string(&ExecType::PartialFill).unwrap(),
            "\"partial_fill\""
        );
        assert_eq!(
            serde_json::to_string(&OrdStatus::PartiallyFilled).unwrap(),
            "\"partially_filled\""
        );
    }

    #[test]
    fn new_order_optional_fields_default() {
        let nos: NewOrderSingle = serde_json::from_str(
            r#"{
                "cl_ord_id": "abc-1",
                "instrument": {"symbol": "AAPL"},
                "side": 1,
                "order_qty": "100",
                "ord_type": 1
            }"#,
        )
        .unwrap();
        assert_eq!(nos.order_qty, dec!(100));
        assert_eq!(nos.price, Decimal::ZERO);
        assert_eq!(nos.time_in_force, "");
        assert_eq!(nos.market_price, Decimal::ZERO);
    }
}
