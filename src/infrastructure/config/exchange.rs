//! Per-exchange settings and pair lists.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::asset::AssetType;
use crate::domain::pair::{CurrencyPair, PairFormat, DEFAULT_DELIMITER};
use crate::error::Result;

/// One `[[exchanges]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub rest_enabled: bool,
    #[serde(default)]
    pub websocket_enabled: bool,
    /// Whether one ticker call refreshes a whole asset type.
    #[serde(default)]
    pub ticker_batching: bool,
    /// Pair lists keyed by asset type (`[exchanges.assets.spot]`).
    #[serde(default)]
    pub assets: BTreeMap<AssetType, AssetPairsConfig>,
}

/// Configured pairs and their spelling for one asset type.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetPairsConfig {
    #[serde(default)]
    pub available: Vec<String>,
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Index currency for concatenated symbols such as `BTCUSD`.
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default = "default_true")]
    pub uppercase: bool,
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl AssetPairsConfig {
    #[must_use]
    pub fn format(&self) -> PairFormat {
        PairFormat {
            delimiter: self.delimiter.clone(),
            index: self.index.clone(),
            uppercase: self.uppercase,
        }
    }

    pub fn available_pairs(&self) -> Result<Vec<CurrencyPair>> {
        parse_all(&self.format(), &self.available)
    }

    pub fn enabled_pairs(&self) -> Result<Vec<CurrencyPair>> {
        parse_all(&self.format(), &self.enabled)
    }

    /// First configured pair string lacking the delimiter or index.
    #[must_use]
    pub fn first_misformatted(&self) -> Option<&str> {
        let format = self.format();
        self.available
            .iter()
            .chain(&self.enabled)
            .find(|s| !format.accepts(s))
            .map(String::as_str)
    }
}

fn parse_all(format: &PairFormat, pairs: &[String]) -> Result<Vec<CurrencyPair>> {
    pairs.iter().map(|s| format.parse(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(available: &[&str], delimiter: &str, index: Option<&str>) -> AssetPairsConfig {
        AssetPairsConfig {
            available: available.iter().map(ToString::to_string).collect(),
            enabled: vec![],
            delimiter: delimiter.into(),
            index: index.map(Into::into),
            uppercase: true,
        }
    }

    #[test]
    fn delimited_pairs_parse() {
        let config = spot(&["BTC_USD", "ETH_BTC"], "_", None);
        assert!(config.first_misformatted().is_none());
        assert_eq!(
            config.available_pairs().unwrap(),
            vec![CurrencyPair::new("BTC", "USD"), CurrencyPair::new("ETH", "BTC")]
        );
    }

    #[test]
    fn index_pairs_parse() {
        let config = spot(&["BTCUSD", "LTCUSD"], "", Some("USD"));
        assert_eq!(config.available_pairs().unwrap()[1], CurrencyPair::new("LTC", "USD"));
    }

    #[test]
    fn missing_delimiter_is_reported() {
        let config = spot(&["BTC-USD", "ETHUSD"], "-", None);
        assert_eq!(config.first_misformatted(), Some("ETHUSD"));
    }
}
