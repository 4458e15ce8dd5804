//! Booked trade record
//!
//! One record per fill, append-only. The book keeper folds these into
//! per-symbol positions.

use crate::ids::{OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub order_id: OrderId,
    pub cl_ord_id: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
    pub commission: Decimal,
    /// UTC `YYYYMMDD-HH:MM:SS.mmm`, stamped at booking time
    pub timestamp: String,
    pub strategy_id: String,
}

impl Trade {
    pub fn notional(&self) -> Decimal {
        self.quantity.notional(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn notional_is_price_times_quantity() {
        let trade = Trade {
            trade_id: TradeId::from_sequence(1),
            order_id: OrderId::from_sequence(1),
            cl_ord_id: "cli-1".to_string(),
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            quantity: Quantity::new(dec!(100)),
            price: Price::new(dec!(150.075)),
            commission: dec!(15.0075),
            timestamp: "20260802-12:00:00.000".to_string(),
            strategy_id: "momentum".to_string(),
        };
        assert_eq!(trade.notional(), dec!(15007.500));
    }
}
