//! Order lifecycle types
//!
//! Orders move pending -> accepted -> {filled | partially_filled |
//! cancelled | rejected}. Filled, cancelled, and rejected are terminal;
//! partially_filled may still become filled or cancelled.

use crate::ids::OrderId;
use crate::instrument::Instrument;
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side. FIX wire codes: buy = 1, sell = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_fix(code: i32) -> Option<Self> {
        match code {
            1 => Some(Side::Buy),
            2 => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn to_fix(&self) -> i32 {
        match self {
            Side::Buy => 1,
            Side::Sell => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type. FIX wire codes: market = 1, limit = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn from_fix(code: i32) -> Option<Self> {
        match code {
            1 => Some(OrderType::Market),
            2 => Some(OrderType::Limit),
            _ => None,
        }
    }

    pub fn to_fix(&self) -> i32 {
        match self {
            OrderType::Market => 1,
            OrderType::Limit => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
        }
    }
}

/// Time in force. Carried through and reported, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
    Gtc,
    Ioc,
}

impl TimeInForce {
    /// Unknown or empty tags fall back to Day.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "gtc" => TimeInForce::Gtc,
            "ioc" => TimeInForce::Ioc,
            _ => TimeInForce::Day,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            TimeInForce::Day => "day",
            TimeInForce::Gtc => "gtc",
            TimeInForce::Ioc => "ioc",
        }
    }
}

impl Default for TimeInForce {
    fn default() -> Self {
        TimeInForce::Day
    }
}

/// Order status machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::PartiallyFilled => "partially_filled",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
        }
    }
}

/// An order as the lifecycle tracks it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub cl_ord_id: String,
    pub order_id: OrderId,
    pub instrument: Instrument,
    pub side: Side,
    pub quantity: Quantity,
    pub order_type: OrderType,
    /// Required for limit orders; a positive price on a market order is
    /// kept as the legacy fallback fill price.
    pub limit_price: Option<Price>,
    pub time_in_force: TimeInForce,
    pub strategy_id: String,
    pub status: OrderStatus,
    pub filled_quantity: Quantity,
    pub avg_fill_price: Option<Price>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cl_ord_id: impl Into<String>,
        order_id: OrderId,
        instrument: Instrument,
        side: Side,
        quantity: Quantity,
        order_type: OrderType,
        limit_price: Option<Price>,
        time_in_force: TimeInForce,
        strategy_id: impl Into<String>,
    ) -> Self {
        Self {
            cl_ord_id: cl_ord_id.into(),
            order_id,
            instrument,
            side,
            quantity,
            order_type,
            limit_price,
            time_in_force,
            strategy_id: strategy_id.into(),
            status: OrderStatus::Pending,
            filled_quantity: Quantity::zero(),
            avg_fill_price: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.instrument.symbol
    }

    /// Unfilled portion of the order
    pub fn leaves_quantity(&self) -> Decimal {
        self.quantity.as_decimal() - self.filled_quantity.as_decimal()
    }

    pub fn is_cancelable(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Accepted | OrderStatus::PartiallyFilled
        )
    }

    /// Apply one fill: cumulative quantity and running VWAP move forward,
    /// status becomes filled once the full quantity is done.
    pub fn record_fill(&mut self, fill_qty: Quantity, fill_price: Price) {
        debug_assert!(
            fill_qty.as_decimal() <= self.leaves_quantity(),
            "fill exceeds leaves"
        );
        let prior_notional = match self.avg_fill_price {
            Some(avg) => self.filled_quantity.as_decimal() * avg.as_decimal(),
            None => Decimal::ZERO,
        };
        self.filled_quantity = self.filled_quantity + fill_qty;
        let notional = prior_notional + fill_qty.notional(fill_price);
        self.avg_fill_price = Price::try_new(notional / self.filled_quantity.as_decimal());

        self.status = if self.leaves_quantity().is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }
}
