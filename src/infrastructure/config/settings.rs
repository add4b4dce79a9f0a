//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file and validated before
//! anything is built from it.
//!
//! # Example
//!
//! ```no_run
//! use arbiter::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use super::currency::CurrencyConfig;
use super::exchange::ExchangeConfig;
use super::logging::LoggingConfig;
use super::polling::PollingConfig;
use super::websocket::WebsocketConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fiat/crypto classes, stablecoin and pair display format.
    #[serde(default)]
    pub currency: CurrencyConfig,

    /// REST polling loops.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Streaming feeds, reconnect policy and relay.
    #[serde(default)]
    pub websocket: WebsocketConfig,

    #[serde(default)]
    pub exchanges: Vec<ExchangeConfig>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.currency.stablecoin.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "currency.stablecoin",
            }
            .into());
        }
        if self.currency.fiat.is_empty() {
            return Err(invalid("currency.fiat", "must list at least one fiat currency"));
        }

        if self.polling.ticker_interval_secs == 0 {
            return Err(invalid("polling.ticker_interval_secs", "must be greater than 0"));
        }
        if self.polling.orderbook_interval_secs == 0 {
            return Err(invalid("polling.orderbook_interval_secs", "must be greater than 0"));
        }

        let ws = &self.websocket;
        if ws.reconnect_interval_ms == 0 {
            return Err(invalid("websocket.reconnect_interval_ms", "must be greater than 0"));
        }
        if ws.shutdown_timeout_ms == 0 {
            return Err(invalid("websocket.shutdown_timeout_ms", "must be greater than 0"));
        }
        if ws.max_reconnect_attempts == Some(0) {
            return Err(invalid(
                "websocket.max_reconnect_attempts",
                "must be greater than 0 when set",
            ));
        }
        if ws.channel_capacity == 0 || ws.broadcast_capacity == 0 {
            return Err(invalid("websocket.capacity", "channel capacities must be greater than 0"));
        }

        self.validate_exchanges()
    }

    fn validate_exchanges(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for exchange in &self.exchanges {
            let name = exchange.name.trim();
            if name.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "exchanges.name",
                }
                .into());
            }
            if !names.insert(name.to_ascii_lowercase()) {
                return Err(invalid("exchanges.name", format!("duplicate exchange '{name}'")));
            }

            for (asset, pairs) in &exchange.assets {
                if pairs.delimiter.is_empty() && pairs.index.is_none() {
                    return Err(invalid(
                        "exchanges.assets.delimiter",
                        format!("{name} {asset}: set a delimiter or an index currency"),
                    ));
                }
                if let Some(bad) = pairs.first_misformatted() {
                    return Err(invalid(
                        "exchanges.assets.available",
                        format!("{name} {asset}: pair '{bad}' does not match the configured format"),
                    ));
                }
                if let Err(e) = pairs.available_pairs().and_then(|_| pairs.enabled_pairs()) {
                    return Err(invalid(
                        "exchanges.assets.available",
                        format!("{name} {asset}: {e}"),
                    ));
                }
            }
        }

        if !self.exchanges.is_empty() && !self.exchanges.iter().any(|e| e.enabled) {
            return Err(invalid("exchanges.enabled", "no exchanges enabled"));
        }
        Ok(())
    }

    /// Names of configured exchanges, enabled or not.
    #[must_use]
    pub fn exchange_names(&self) -> Vec<&str> {
        self.exchanges.iter().map(|e| e.name.as_str()).collect()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::AssetType;
    use crate::error::Error;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.polling.ticker_interval_secs, 10);
        assert_eq!(config.websocket.reconnect_interval_ms, 3000);
        assert_eq!(config.websocket.shutdown_timeout_ms, 5000);
        assert_eq!(config.currency.stablecoin, "USDT");
        assert!(config.exchanges.is_empty());
    }

    #[test]
    fn parses_exchange_assets() {
        let toml = r#"
            [[exchanges]]
            name = "alpha"
            ticker_batching = true

            [exchanges.assets.spot]
            available = ["BTC-USD", "ETH-USD"]
            enabled = ["BTC-USD"]

            [exchanges.assets.perpetual_swap]
            available = ["BTCUSD"]
            enabled = ["BTCUSD"]
            delimiter = ""
            index = "USD"
        "#;

        let config = Config::parse_toml(toml).unwrap();
        let alpha = &config.exchanges[0];
        assert!(alpha.enabled && alpha.rest_enabled && !alpha.websocket_enabled);
        assert!(alpha.ticker_batching);
        assert_eq!(alpha.assets[&AssetType::Spot].enabled, ["BTC-USD"]);
        assert_eq!(alpha.assets[&AssetType::PerpetualSwap].index.as_deref(), Some("USD"));
    }

    #[test]
    fn rejects_misformatted_pair() {
        let toml = r#"
            [[exchanges]]
            name = "alpha"
            [exchanges.assets.spot]
            available = ["BTC_USD"]
        "#;
        let err = Config::parse_toml(toml).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "exchanges.assets.available", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_exchange_names() {
        let toml = r#"
            [[exchanges]]
            name = "alpha"
            [[exchanges]]
            name = "ALPHA"
        "#;
        assert!(Config::parse_toml(toml).is_err());
    }

    #[test]
    fn rejects_all_exchanges_disabled() {
        let toml = r#"
            [[exchanges]]
            name = "alpha"
            enabled = false
        "#;
        assert!(Config::parse_toml(toml).is_err());
    }

    #[test]
    fn rejects_zero_reconnect_attempts() {
        let toml = "[websocket]\nmax_reconnect_attempts = 0\n";
        assert!(Config::parse_toml(toml).is_err());
    }
}
