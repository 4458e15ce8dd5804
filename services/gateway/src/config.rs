//! Configuration
//!
//! TOML file with optional sections; anything missing falls back to the
//! defaults below, and CLI flags override the file. A missing file is not
//! an error, a malformed one is logged and ignored.

use std::path::Path;

use matching_engine::SeedConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use types::numeric::Quantity;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub matching: MatchingConfig,
    pub commission: CommissionConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5555".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub spread_bps: f64,
    pub depth_levels: usize,
    pub qty_per_level: f64,
    pub auto_seed_book: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            spread_bps: 10.0,
            depth_levels: 5,
            qty_per_level: 1000.0,
            auto_seed_book: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommissionConfig {
    pub rate: f64,
    /// Commission floor; accepted for config compatibility, commissions
    /// are charged at exactly `fill_price * fill_qty * rate`
    pub min: f64,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            rate: 0.001,
            min: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub report_interval_s: u64,
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_s: 60,
            enabled: true,
        }
    }
}

impl Config {
    /// Load from a TOML file, tolerating absence and parse failures
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(path) else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Seeding parameters for the matching engine
    pub fn seed_config(&self) -> SeedConfig {
        let defaults = SeedConfig::default();
        SeedConfig {
            spread_bps: Decimal::try_from(self.matching.spread_bps)
                .ok()
                .filter(|v| !v.is_sign_negative())
                .unwrap_or(defaults.spread_bps),
            depth_levels: self.matching.depth_levels,
            qty_per_level: Decimal::try_from(self.matching.qty_per_level)
                .ok()
                .and_then(Quantity::try_new)
                .unwrap_or(defaults.qty_per_level),
            auto_seed: self.matching.auto_seed_book,
        }
    }

    pub fn commission_rate(&self) -> Decimal {
        Decimal::try_from(self.commission.rate).unwrap_or(dec!(0.001))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:5555");
        assert_eq!(config.matching.spread_bps, 10.0);
        assert_eq!(config.matching.depth_levels, 5);
        assert_eq!(config.commission.rate, 0.001);
        assert_eq!(config.commission.min, 0.0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.metrics.report_interval_s, 60);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn partial_toml_keeps_defaults_elsewhere() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind_address = "127.0.0.1:7777"

            [matching]
            spread_bps = 20.0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:7777");
        assert_eq!(config.matching.spread_bps, 20.0);
        // Untouched sections stay at defaults
        assert_eq!(config.matching.depth_levels, 5);
        assert_eq!(config.commission.rate, 0.001);
    }

    #[test]
    fn seed_config_converts_to_decimals() {
        let config: Config = toml::from_str(
            r#"
            [matching]
            spread_bps = 20.0
            depth_levels = 3
            qty_per_level = 500.0
            auto_seed_book = false
            "#,
        )
        .unwrap();

        let seed = config.seed_config();
        assert_eq!(seed.spread_bps, dec!(20));
        assert_eq!(seed.depth_levels, 3);
        assert_eq!(seed.qty_per_level.as_decimal(), dec!(500));
        assert!(!seed.auto_seed);
    }

    #[test]
    fn commission_rate_is_exact() {
        assert_eq!(Config::default().commission_rate(), dec!(0.001));
    }

    #[test]
    fn commission_section_parses_both_fields() {
        let config: Config = toml::from_str(
            r#"
            [commission]
            rate = 0.002
            min = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(config.commission.rate, 0.002);
        assert_eq!(config.commission.min, 1.5);
        assert_eq!(config.commission_rate(), dec!(0.002));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/tradecore.toml"));
        assert_eq!(config.server.bind_address, "0.0.0.0:5555");
    }
}
