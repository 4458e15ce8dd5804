//! Decimal price and quantity types
//!
//! Uses rust_decimal so that arithmetic is exact and two orders quoting the
//! same price always land on the same book level; prices are never rounded
//! or re-keyed. Serialized as strings to survive any wire format without
//! precision loss.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Strictly positive price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// # Panics
    /// Panics if the value is zero or negative; use [`Price::try_new`] for
    /// unvalidated input.
    pub fn new(value: Decimal) -> Self {
        assert!(value > Decimal::ZERO, "Price must be positive");
        Self(value)
    }

    pub fn try_new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Self::new(Decimal::from_str(s)?))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Self::try_new(value).ok_or_else(|| serde::de::Error::custom("Price must be positive"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative quantity
///
/// Construction rejects non-positive values; `zero()` exists for remaining
/// and cumulative quantities that legitimately reach zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(Decimal);

impl Quantity {
    /// # Panics
    /// Panics if the value is zero or negative; use [`Quantity::try_new`]
    /// for unvalidated input.
    pub fn new(value: Decimal) -> Self {
        assert!(value > Decimal::ZERO, "Quantity must be positive");
        Self(value)
    }

    pub fn try_new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Self::new(Decimal::from_str(s)?))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Notional value of this quantity at `price`
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.as_decimal()
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.0 >= rhs.0, "Quantity subtraction would go negative");
        Self(self.0 - rhs.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(serde::de::Error::custom("Quantity cannot be negative"))
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_rejects_non_positive() {
        assert!(Price::try_new(dec!(0)).is_none());
        assert!(Price::try_new(dec!(-1.5)).is_none());
        assert!(Price::try_new(dec!(0.0001)).is_some());
    }

    #[test]
    #[should_panic(expected = "Price must be positive")]
    fn price_new_panics_on_zero() {
        Price::new(Decimal::ZERO);
    }

    #[test]
    fn equal_decimals_are_equal_prices() {
        // Same wire string, same key: the book never splits a level.
        let a = Price::from_str("150.075").unwrap();
        let b = Price::from_str("150.075").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn price_orders_numerically() {
        let low = Price::new(dec!(149.925));
        let high = Price::new(dec!(150.075));
        assert!(low < high);
    }

    #[test]
    fn quantity_arithmetic() {
        let total = Quantity::new(dec!(250));
        let filled = Quantity::new(dec!(100));
        assert_eq!((total - filled).as_decimal(), dec!(150));
        assert_eq!((filled + filled).as_decimal(), dec!(200));
        assert_eq!(total.min(filled), filled);
    }

    #[test]
    fn quantity_notional() {
        let qty = Quantity::new(dec!(100));
        assert_eq!(qty.notional(Price::new(dec!(150.075))), dec!(15007.500));
    }

    #[test]
    #[should_panic(expected = "go negative")]
    fn quantity_sub_past_zero_panics() {
        let _ = Quantity::new(dec!(1)) - Quantity::new(dec!(2));
    }

    #[test]
    fn string_serde_preserves_precision() {
        let px = Price::new(dec!(150.075));
        assert_eq!(serde_json::to_string(&px).unwrap(), "\"150.075\"");
        let back: Price = serde_json::from_str("\"150.075\"").unwrap();
        assert_eq!(back, px);

        let zero: Quantity = serde_json::from_str("\"0\"").unwrap();
        assert!(zero.is_zero());
        assert!(serde_json::from_str::<Quantity>("\"-5\"").is_err());
    }
}
