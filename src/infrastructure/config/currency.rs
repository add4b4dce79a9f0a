//! Currency classification and display settings.

use serde::Deserialize;

use crate::domain::currency::{
    CurrencyClasses, CurrencyCode, DEFAULT_CRYPTO, DEFAULT_FIAT, DEFAULT_STABLECOIN,
};
use crate::domain::pair::{DisplayFormat, DEFAULT_DELIMITER};

/// `[currency]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Symbol removed by the stablecoin exclusion filter.
    #[serde(default = "default_stablecoin")]
    pub stablecoin: String,
    #[serde(default = "default_fiat")]
    pub fiat: Vec<String>,
    #[serde(default = "default_crypto")]
    pub crypto: Vec<String>,
    #[serde(default = "default_display_delimiter")]
    pub display_delimiter: String,
    #[serde(default = "default_display_uppercase")]
    pub display_uppercase: bool,
}

fn default_stablecoin() -> String {
    DEFAULT_STABLECOIN.to_string()
}

fn default_fiat() -> Vec<String> {
    DEFAULT_FIAT.iter().map(ToString::to_string).collect()
}

fn default_crypto() -> Vec<String> {
    DEFAULT_CRYPTO.iter().map(ToString::to_string).collect()
}

fn default_display_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_display_uppercase() -> bool {
    true
}

impl CurrencyConfig {
    #[must_use]
    pub fn classes(&self) -> CurrencyClasses {
        CurrencyClasses::new(
            self.fiat.iter().map(CurrencyCode::new),
            self.crypto.iter().map(CurrencyCode::new),
            CurrencyCode::new(&self.stablecoin),
        )
    }

    #[must_use]
    pub fn display(&self) -> DisplayFormat {
        DisplayFormat {
            delimiter: self.display_delimiter.clone(),
            uppercase: self.display_uppercase,
        }
    }
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            stablecoin: default_stablecoin(),
            fiat: default_fiat(),
            crypto: default_crypto(),
            display_delimiter: default_display_delimiter(),
            display_uppercase: default_display_uppercase(),
        }
    }
}
