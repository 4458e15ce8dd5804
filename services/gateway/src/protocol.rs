//! Response builders and frame codec
//!
//! Every response copies the request's sender as its target, stamps the
//! engine CompID and a fresh message id, and times itself in UTC. On the
//! wire an envelope is a 4-byte big-endian length followed by its bincode
//! serialization.

use chrono::Utc;
use rust_decimal::Decimal;
use types::ids::ExecId;
use types::order::{Order, OrderStatus};
use types::position::Position;

use crate::error::GatewayError;
use crate::models::{
    Body, Envelope, ExecType, ExecutionReport, Heartbeat, OrdStatus, PositionEntry,
    PositionReport, Reject, ENGINE_COMP_ID,
};

/// Largest frame the server will read or write
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// UTC timestamp in the FIX-style `YYYYMMDD-HH:MM:SS.mmm` form
pub fn current_timestamp() -> String {
    Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

/// Envelope skeleton for a response to `request`
fn respond(request: &Envelope, body: Body) -> Envelope {
    Envelope {
        sender_comp_id: ENGINE_COMP_ID.to_string(),
        target_comp_id: request.sender_comp_id.clone(),
        msg_seq_num: ExecId::generate().to_string(),
        sending_time: current_timestamp(),
        body,
    }
}

pub fn make_reject(request: &Envelope, text: impl Into<String>) -> Envelope {
    respond(
        request,
        Body::Reject(Reject {
            ref_msg_seq_num: request.msg_seq_num.clone(),
            text: text.into(),
        }),
    )
}

pub fn make_heartbeat(request: &Envelope, heartbeat: &Heartbeat) -> Envelope {
    respond(
        request,
        Body::Heartbeat(Heartbeat {
            test_req_id: heartbeat.test_req_id.clone(),
        }),
    )
}

/// Acknowledgement for a limit order that rested without trading
pub fn make_execution_report_new(request: &Envelope, order: &Order) -> Envelope {
    respond(
        request,
        Body::ExecutionReport(ExecutionReport {
            order_id: order.order_id.to_string(),
            cl_ord_id: order.cl_ord_id.clone(),
            exec_id: ExecId::generate().to_string(),
            exec_type: ExecType::New,
            ord_status: OrdStatus::New,
            instrument: order.instrument.clone(),
            side: order.side.to_fix(),
            order_qty: order.quantity.as_decimal(),
            last_px: Decimal::ZERO,
            last_qty: Decimal::ZERO,
            leaves_qty: order.quantity.as_decimal(),
            cum_qty: Decimal::ZERO,
            avg_px: Decimal::ZERO,
            commission: Decimal::ZERO,
            transact_time: current_timestamp(),
        }),
    )
}

/// One report per fill. `cum_qty` and the order's recorded fills drive
/// `leaves_qty`, the exec type, and the running average.
#[allow(clippy::too_many_arguments)]
pub fn make_execution_report_fill(
    request: &Envelope,
    order: &Order,
    last_px: Decimal,
    last_qty: Decimal,
    cum_qty: Decimal,
    avg_px: Decimal,
    commission: Decimal,
) -> Envelope {
    let leaves_qty = order.quantity.as_decimal() - cum_qty;
    let (exec_type, ord_status) = if leaves_qty.is_zero() {
        (ExecType::Fill, OrdStatus::Filled)
    } else {
        (ExecType::PartialFill, OrdStatus::PartiallyFilled)
    };

    respond(
        request,
        Body::ExecutionReport(ExecutionReport {
            order_id: order.order_id.to_string(),
            cl_ord_id: order.cl_ord_id.clone(),
            exec_id: ExecId::generate().to_string(),
            exec_type,
            ord_status,
            instrument: order.instrument.clone(),
            side: order.side.to_fix(),
            order_qty: order.quantity.as_decimal(),
            last_px,
            last_qty,
            leaves_qty,
            cum_qty,
            avg_px,
            commission,
            transact_time: current_timestamp(),
        }),
    )
}

/// Confirmation of a cancel, echoing the client's original id
pub fn make_execution_report_cancelled(
    request: &Envelope,
    order: &Order,
    orig_cl_ord_id: &str,
) -> Envelope {
    debug_assert_eq!(order.status, OrderStatus::Cancelled);
    respond(
        request,
        Body::ExecutionReport(ExecutionReport {
            order_id: order.order_id.to_string(),
            cl_ord_id: orig_cl_ord_id.to_string(),
            exec_id: ExecId::generate().to_string(),
            exec_type: ExecType::Cancelled,
            ord_status: OrdStatus::Cancelled,
            instrument: order.instrument.clone(),
            side: order.side.to_fix(),
            order_qty: order.quantity.as_decimal(),
            last_px: Decimal::ZERO,
            last_qty: Decimal::ZERO,
            leaves_qty: order.leaves_quantity(),
            cum_qty: order.filled_quantity.as_decimal(),
            avg_px: order
                .avg_fill_price
                .map(|p| p.as_decimal())
                .unwrap_or(Decimal::ZERO),
            commission: Decimal::ZERO,
            transact_time: current_timestamp(),
        }),
    )
}

pub fn make_position_report(request: &Envelope, positions: &[Position]) -> Envelope {
    let entries = positions
        .iter()
        .map(|pos| PositionEntry {
            instrument: types::instrument::Instrument::equity(pos.symbol.clone()),
            long_qty: pos.long_quantity(),
            short_qty: pos.short_quantity(),
            avg_price: pos.avg_price,
            realized_pnl: pos.realized_pnl,
        })
        .collect();

    respond(
        request,
        Body::PositionReport(PositionReport {
            pos_rpt_id: ExecId::generate().to_string(),
            positions: entries,
        }),
    )
}

/// Serialize an envelope into one length-prefixed frame
pub fn encode_frame(envelope: &Envelope) -> Result<Vec<u8>, GatewayError> {
    let payload = bincode::serialize(envelope)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(GatewayError::FrameTooLarge(payload.len()));
    }
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode the payload of one frame (length prefix already stripped)
pub fn decode_envelope(payload: &[u8]) -> Result<Envelope, GatewayError> {
    Ok(bincode::deserialize(payload)?)
}
