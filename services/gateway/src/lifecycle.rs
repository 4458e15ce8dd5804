//! Order lifecycle
//!
//! Validates incoming orders, mints identifiers, drives the matcher, books
//! resulting trades, and answers cancels and position queries. One request
//! is processed to completion before the next; nothing in here suspends.

use std::collections::HashMap;
use std::sync::Arc;

use matching_engine::MatchingEngine;
use rust_decimal::Decimal;
use types::errors::{OrderError, ProtocolError};
use types::ids::{FillId, OrderId, TradeId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, OrderType, Side, TimeInForce};
use types::trade::Trade;

use crate::booking::BookKeeper;
use crate::events::{EngineEvent, EventSink};
use crate::models::{Body, Envelope, NewOrderSingle};
use crate::protocol;

pub struct Lifecycle {
    matcher: MatchingEngine,
    book_keeper: BookKeeper,
    orders: HashMap<OrderId, Order>,
    by_cl_ord_id: HashMap<String, OrderId>,
    order_seq: u64,
    fill_seq: u64,
    trade_seq: u64,
    commission_rate: Decimal,
    events: Arc<dyn EventSink>,
}

impl Lifecycle {
    pub fn new(
        matcher: MatchingEngine,
        book_keeper: BookKeeper,
        commission_rate: Decimal,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            matcher,
            book_keeper,
            orders: HashMap::new(),
            by_cl_ord_id: HashMap::new(),
            order_seq: 0,
            fill_seq: 0,
            trade_seq: 0,
            commission_rate,
            events,
        }
    }

    /// Dispatch one request to its handler. Always returns at least one
    /// response; requests the engine does not serve get a reject.
    pub fn handle(&mut self, request: &Envelope) -> Vec<Envelope> {
        match &request.body {
            Body::NewOrderSingle(_) => self.handle_new_order(request),
            Body::OrderCancelRequest(_) => self.handle_cancel_request(request),
            Body::PositionRequest(_) => self.handle_position_request(request),
            Body::Heartbeat(heartbeat) => vec![protocol::make_heartbeat(request, heartbeat)],
            _ => vec![protocol::make_reject(
                request,
                ProtocolError::Unsupported.to_string(),
            )],
        }
    }

    pub fn handle_new_order(&mut self, request: &Envelope) -> Vec<Envelope> {
        let Body::NewOrderSingle(nos) = &request.body else {
            let error = ProtocolError::WrongBody {
                expected: "NewOrderSingle",
            };
            return vec![protocol::make_reject(request, error.to_string())];
        };
        self.events.record(&EngineEvent::OrderReceived);

        let (side, order_type) = match parse_type_fields(nos) {
            Ok(fields) => fields,
            Err(error) => return vec![self.reject_order(request, error.to_string())],
        };

        let order_id = self.next_order_id();

        let mut order = match build_order(nos, order_id, side, order_type) {
            Ok(order) => order,
            Err(error) => return vec![self.reject_order(request, error.to_string())],
        };
        order.status = OrderStatus::Accepted;

        tracing::info!(
            order_id = %order.order_id,
            side = order.side.as_str(),
            quantity = %order.quantity,
            symbol = order.symbol(),
            order_type = order.order_type.as_str(),
            "order accepted"
        );
        self.events.record(&EngineEvent::OrderAccepted {
            order_id: order.order_id.clone(),
        });

        // Reference-price hint rides along on the order
        if let Some(hint) = Price::try_new(nos.market_price) {
            self.matcher.update_reference_price(order.symbol(), hint);
        }

        let result = self.matcher.try_match(&order);
        let mut responses = Vec::new();

        if !result.fills.is_empty() {
            let mut cum_qty = Decimal::ZERO;
            let mut notional = Decimal::ZERO;

            for fill in &result.fills {
                let fill_id = self.next_fill_id();
                let trade_id = self.next_trade_id();
                let commission = fill.quantity.notional(fill.price) * self.commission_rate;
                cum_qty += fill.quantity.as_decimal();
                notional += fill.quantity.notional(fill.price);
                let avg_px = notional / cum_qty;

                self.book_keeper.book_trade(Trade {
                    trade_id,
                    order_id: order.order_id.clone(),
                    cl_ord_id: order.cl_ord_id.clone(),
                    symbol: order.symbol().to_string(),
                    side: order.side,
                    quantity: fill.quantity,
                    price: fill.price,
                    commission,
                    timestamp: protocol::current_timestamp(),
                    strategy_id: order.strategy_id.clone(),
                });

                order.record_fill(fill.quantity, fill.price);
                self.events.record(&EngineEvent::OrderFilled {
                    order_id: order.order_id.clone(),
                    quantity: fill.quantity,
                    price: fill.price,
                    leaves: order.leaves_quantity(),
                });
                tracing::info!(
                    %fill_id,
                    symbol = order.symbol(),
                    quantity = %fill.quantity,
                    price = %fill.price,
                    "fill"
                );

                responses.push(protocol::make_execution_report_fill(
                    request,
                    &order,
                    fill.price.as_decimal(),
                    fill.quantity.as_decimal(),
                    cum_qty,
                    avg_px,
                    commission,
                ));
            }
        } else if order.order_type == OrderType::Limit && !result.remaining_quantity.is_zero() {
            // Rested without trading
            responses.push(protocol::make_execution_report_new(request, &order));
        } else {
            order.status = OrderStatus::Rejected;
            let error = OrderError::NoMatch;
            self.events.record(&EngineEvent::OrderRejected {
                reason: error.to_string(),
            });
            responses.push(protocol::make_reject(request, error.to_string()));
        }

        // Accepted orders are stored and indexed, whatever became of them;
        // rejects minted before acceptance never were
        self.by_cl_ord_id
            .insert(order.cl_ord_id.clone(), order.order_id.clone());
        self.orders.insert(order.order_id.clone(), order);

        responses
    }

    pub fn handle_cancel_request(&mut self, request: &Envelope) -> Vec<Envelope> {
        let Body::OrderCancelRequest(ocr) = &request.body else {
            let error = ProtocolError::WrongBody {
                expected: "OrderCancelRequest",
            };
            return vec![protocol::make_reject(request, error.to_string())];
        };

        let Some(order_id) = self.by_cl_ord_id.get(&ocr.orig_cl_ord_id).cloned() else {
            let error = OrderError::UnknownOrder {
                cl_ord_id: ocr.orig_cl_ord_id.clone(),
            };
            return vec![protocol::make_reject(request, error.to_string())];
        };
        let Some(order) = self.orders.get_mut(&order_id) else {
            let error = OrderError::UnknownOrder {
                cl_ord_id: ocr.orig_cl_ord_id.clone(),
            };
            return vec![protocol::make_reject(request, error.to_string())];
        };

        if !order.is_cancelable() {
            let error = OrderError::NotCancelable {
                cl_ord_id: ocr.orig_cl_ord_id.clone(),
                status: order.status.as_str().to_string(),
            };
            return vec![protocol::make_reject(request, error.to_string())];
        }

        // A fully matched racer is already out of the book; accepting the
        // cancel anyway keeps the client's view idempotent
        let _ = self
            .matcher
            .cancel(&order.instrument.symbol.clone(), &order_id);

        order.status = OrderStatus::Cancelled;
        self.events.record(&EngineEvent::OrderCancelled {
            order_id: order_id.clone(),
        });
        tracing::info!(%order_id, orig_cl_ord_id = %ocr.orig_cl_ord_id, "order cancelled");

        vec![protocol::make_execution_report_cancelled(
            request,
            order,
            &ocr.orig_cl_ord_id,
        )]
    }

    pub fn handle_position_request(&mut self, request: &Envelope) -> Vec<Envelope> {
        let positions = self.book_keeper.positions();
        vec![protocol::make_position_report(request, &positions)]
    }

    fn reject_order(&self, request: &Envelope, reason: String) -> Envelope {
        self.events.record(&EngineEvent::OrderRejected {
            reason: reason.clone(),
        });
        protocol::make_reject(request, reason)
    }

    fn next_order_id(&mut self) -> OrderId {
        self.order_seq += 1;
        OrderId::from_sequence(self.order_seq)
    }

    fn next_fill_id(&mut self) -> FillId {
        self.fill_seq += 1;
        FillId::from_sequence(self.fill_seq)
    }

    fn next_trade_id(&mut self) -> TradeId {
        self.trade_seq += 1;
        TradeId::from_sequence(self.trade_seq)
    }

    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn matcher(&self) -> &MatchingEngine {
        &self.matcher
    }

    pub fn book_keeper(&self) -> &BookKeeper {
        &self.book_keeper
    }
}

fn parse_type_fields(nos: &NewOrderSingle) -> Result<(Side, OrderType), ProtocolError> {
    let side = Side::from_fix(nos.side)
        .ok_or_else(|| ProtocolError::Parse(format!("Unknown side: {}", nos.side)))?;
    let order_type = OrderType::from_fix(nos.ord_type)
        .ok_or_else(|| ProtocolError::Parse(format!("Unknown order type: {}", nos.ord_type)))?;
    Ok((side, order_type))
}

fn build_order(
    nos: &NewOrderSingle,
    order_id: OrderId,
    side: Side,
    order_type: OrderType,
) -> Result<Order, OrderError> {
    if nos.cl_ord_id.is_empty() {
        return Err(OrderError::MissingClOrdId);
    }
    if nos.instrument.symbol.is_empty() {
        return Err(OrderError::MissingSymbol);
    }
    let quantity = Quantity::try_new(nos.order_qty).ok_or(OrderError::InvalidQuantity)?;
    let limit_price = match order_type {
        OrderType::Limit => Some(Price::try_new(nos.price).ok_or(OrderError::InvalidPrice)?),
        // A positive price on a market order survives as the legacy
        // fallback fill price
        OrderType::Market => Price::try_new(nos.price),
    };

    Ok(Order::new(
        nos.cl_ord_id.clone(),
        order_id,
        nos.instrument.clone(),
        side,
        quantity,
        order_type,
        limit_price,
        TimeInForce::from_tag(&nos.time_in_force),
        nos.text.clone(),
    ))
}
