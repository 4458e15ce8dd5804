//! Instrument definitions
//!
//! The engine matches on `symbol` alone; every other field is descriptive
//! and passed through to execution reports untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broad asset class tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Future,
    Option,
    Fx,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Future => "future",
            AssetClass::Option => "option",
            AssetClass::Fx => "fx",
        }
    }
}

impl Default for AssetClass {
    fn default() -> Self {
        AssetClass::Equity
    }
}

/// A tradable instrument
///
/// Case-sensitive `symbol` is the only field the core interprets. Futures,
/// options, and FX carry their descriptive extras in the optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub exchange: Option<String>,
    pub currency: String,
    pub tick_size: Decimal,
    pub contract_size: Decimal,

    // Futures
    pub expiry: Option<String>,

    // Options
    pub underlying: Option<String>,
    pub strike: Option<Decimal>,
    pub option_type: Option<String>,

    // FX
    pub base_currency: Option<String>,
    pub quote_currency: Option<String>,
    pub pip_size: Option<Decimal>,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            asset_class: AssetClass::Equity,
            exchange: None,
            currency: "USD".to_string(),
            tick_size: Decimal::new(1, 2),
            contract_size: Decimal::ONE,
            expiry: None,
            underlying: None,
            strike: None,
            option_type: None,
            base_currency: None,
            quote_currency: None,
            pip_size: None,
        }
    }
}

impl Instrument {
    /// Plain equity instrument, the common case in tests and reports
    pub fn equity(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}
