//! Per-symbol position with signed quantity and realized PnL
//!
//! `quantity` is positive long, negative short, zero flat. PnL is realized
//! only on the portion of a fill that closes existing exposure; the portion
//! that flips through flat opens the other way at the fill price.
//!
//! Invariant: when non-flat, `cost_basis == |quantity| * avg_price` (to
//! decimal division tolerance); when flat, `avg_price` and `cost_basis`
//! are exactly zero.

use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub cost_basis: Decimal,
    pub realized_pnl: Decimal,
}

impl Position {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    pub fn long_quantity(&self) -> Decimal {
        self.quantity.max(Decimal::ZERO)
    }

    pub fn short_quantity(&self) -> Decimal {
        (-self.quantity).max(Decimal::ZERO)
    }

    /// Fold one fill into the position
    pub fn apply_fill(&mut self, side: Side, fill_qty: Quantity, fill_price: Price) {
        let qty = fill_qty.as_decimal();
        let price = fill_price.as_decimal();

        match side {
            Side::Buy => {
                if self.quantity >= Decimal::ZERO {
                    // Opening or adding to a long
                    self.cost_basis += qty * price;
                    self.quantity += qty;
                    self.avg_price = self.cost_basis / self.quantity;
                } else {
                    // Covering a short; realize on the covered portion only
                    let covered = qty.min(-self.quantity);
                    self.realized_pnl += covered * (self.avg_price - price);
                    self.quantity += qty;
                    if self.quantity > Decimal::ZERO {
                        // Flipped long: the residual is priced at the fill
                        self.avg_price = price;
                        self.cost_basis = self.quantity * price;
                    } else if self.quantity.is_zero() {
                        self.avg_price = Decimal::ZERO;
                        self.cost_basis = Decimal::ZERO;
                    } else {
                        // Still short, average unchanged
                        self.cost_basis = -self.quantity * self.avg_price;
                    }
                }
            }
            Side::Sell => {
                if self.quantity > Decimal::ZERO {
                    // Closing a long; realize on the closed portion only
                    let closed = qty.min(self.quantity);
                    self.realized_pnl += closed * (price - self.avg_price);
                    self.quantity -= qty;
                    if self.quantity < Decimal::ZERO {
                        // Flipped short: the residual is priced at the fill
                        self.avg_price = price;
                        self.cost_basis = -self.quantity * price;
                    } else if self.quantity.is_zero() {
                        self.avg_price = Decimal::ZERO;
                        self.cost_basis = Decimal::ZERO;
                    } else {
                        // Still long, average unchanged
                        self.cost_basis = self.quantity * self.avg_price;
                    }
                } else {
                    // Opening or adding to a short
                    self.cost_basis += qty * price;
                    self.quantity -= qty;
                    self.avg_price = self.cost_basis / -self.quantity;
                }
            }
        }

        debug_assert!(
            if self.quantity.is_zero() {
                self.avg_price.is_zero() && self.cost_basis.is_zero()
            } else {
                (self.cost_basis - self.quantity.abs() * self.avg_price).abs()
                    < Decimal::new(1, 9)
            },
            "cost basis diverged from |quantity| * avg_price"
        );
    }
}
