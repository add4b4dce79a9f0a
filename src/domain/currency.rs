//! Currency codes and fiat/crypto classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pair::CurrencyPair;

/// An upper-cased currency symbol such as `BTC` or `USD`.
///
/// The inner String is private so every code goes through normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new code, trimming whitespace and upper-casing.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&CurrencyCode> for CurrencyCode {
    fn from(code: &CurrencyCode) -> Self {
        code.clone()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl PartialEq<str> for CurrencyCode {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

/// Known fiat and crypto currencies plus the designated stablecoin.
///
/// Drives the fiat substitution in relatability queries and the
/// fiat/crypto pair filters used by aggregation.
#[derive(Debug, Clone)]
pub struct CurrencyClasses {
    fiat: Vec<CurrencyCode>,
    crypto: Vec<CurrencyCode>,
    stablecoin: CurrencyCode,
}

pub const DEFAULT_STABLECOIN: &str = "USDT";

pub const DEFAULT_FIAT: &[&str] = &["USD", "AUD", "EUR", "CNY", "GBP", "JPY", "CAD"];

pub const DEFAULT_CRYPTO: &[&str] = &[
    "BTC", "LTC", "ETH", "XRP", "NMC", "NVC", "PPC", "XBT", "DOGE", "DASH", "XETH", "XDG", "USDT",
];

impl CurrencyClasses {
    #[must_use]
    pub fn new(
        fiat: impl IntoIterator<Item = CurrencyCode>,
        crypto: impl IntoIterator<Item = CurrencyCode>,
        stablecoin: CurrencyCode,
    ) -> Self {
        Self {
            fiat: fiat.into_iter().collect(),
            crypto: crypto.into_iter().collect(),
            stablecoin,
        }
    }

    #[must_use]
    pub fn fiat(&self) -> &[CurrencyCode] {
        &self.fiat
    }

    #[must_use]
    pub fn crypto(&self) -> &[CurrencyCode] {
        &self.crypto
    }

    /// The symbol removed by the stablecoin exclusion filter.
    #[must_use]
    pub fn stablecoin(&self) -> &CurrencyCode {
        &self.stablecoin
    }

    #[must_use]
    pub fn is_fiat(&self, code: &CurrencyCode) -> bool {
        self.fiat.contains(code)
    }

    #[must_use]
    pub fn is_crypto(&self, code: &CurrencyCode) -> bool {
        self.crypto.contains(code)
    }

    /// True when one side is a cryptocurrency and the other is fiat.
    #[must_use]
    pub fn is_crypto_fiat_pair(&self, pair: &CurrencyPair) -> bool {
        (self.is_crypto(pair.first()) && self.is_fiat(pair.second()))
            || (self.is_fiat(pair.first()) && self.is_crypto(pair.second()))
    }

    /// True when both sides are cryptocurrencies.
    #[must_use]
    pub fn is_crypto_pair(&self, pair: &CurrencyPair) -> bool {
        self.is_crypto(pair.first()) && self.is_crypto(pair.second())
    }
}

impl Default for CurrencyClasses {
    fn default() -> Self {
        Self::new(
            DEFAULT_FIAT.iter().copied().map(CurrencyCode::from),
            DEFAULT_CRYPTO.iter().copied().map(CurrencyCode::from),
            CurrencyCode::from(DEFAULT_STABLECOIN),
        )
    }
}
