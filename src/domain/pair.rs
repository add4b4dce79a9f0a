//! Currency pairs, pair formats and deduplicated pair sets.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use crate::error::Error;

/// Delimiter used when none is given.
pub const DEFAULT_DELIMITER: &str = "-";

/// Delimiters recognized when parsing a pair without an explicit format.
const KNOWN_DELIMITERS: [&str; 3] = ["-", "_", "/"];

/// An ordered two-currency trading instrument such as `BTC-USD`.
///
/// Equality, ordering and hashing are order-aware and ignore the display
/// delimiter, so `BTC-USD == BTC_USD` but `BTC-USD != USD-BTC`. Use
/// [`CurrencyPair::matches_either_order`] for the order-agnostic check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyPair {
    first: CurrencyCode,
    second: CurrencyCode,
    #[serde(default = "default_delimiter")]
    delimiter: String,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl CurrencyPair {
    /// Create a pair with the default `-` delimiter.
    pub fn new(first: impl Into<CurrencyCode>, second: impl Into<CurrencyCode>) -> Self {
        Self::with_delimiter(first, second, DEFAULT_DELIMITER)
    }

    pub fn with_delimiter(
        first: impl Into<CurrencyCode>,
        second: impl Into<CurrencyCode>,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            delimiter: delimiter.into(),
        }
    }

    /// Parse an exchange-native string split on `delimiter`.
    pub fn from_delimited(input: &str, delimiter: &str) -> Result<Self, Error> {
        if delimiter.is_empty() {
            return Err(parse_error(input, "empty delimiter"));
        }
        let (first, second) = input
            .split_once(delimiter)
            .ok_or_else(|| parse_error(input, format!("missing delimiter '{delimiter}'")))?;
        Self::checked(input, first, second, delimiter)
    }

    /// Parse a concatenated symbol like `BTCUSD` around a known currency.
    ///
    /// When the index currency leads the string it becomes the first
    /// currency, otherwise everything before it is the first currency.
    pub fn from_index(input: &str, index: &str) -> Result<Self, Error> {
        let upper = input.trim().to_ascii_uppercase();
        let index = index.trim().to_ascii_uppercase();
        if index.is_empty() {
            return Err(parse_error(input, "empty index currency"));
        }
        let position = upper
            .find(&index)
            .ok_or_else(|| parse_error(input, format!("index currency '{index}' not found")))?;
        let (first, second) = if position == 0 {
            upper.split_at(index.len())
        } else {
            upper.split_at(position)
        };
        Self::checked(input, first, second, DEFAULT_DELIMITER)
    }

    fn checked(input: &str, first: &str, second: &str, delimiter: &str) -> Result<Self, Error> {
        let pair = Self::with_delimiter(first, second, delimiter);
        if pair.first.is_empty() || pair.second.is_empty() {
            return Err(parse_error(input, "both currencies must be non-empty"));
        }
        Ok(pair)
    }

    #[must_use]
    pub fn first(&self) -> &CurrencyCode {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &CurrencyCode {
        &self.second
    }

    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The same pair with first and second exchanged.
    #[must_use]
    pub fn swap(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
            delimiter: self.delimiter.clone(),
        }
    }

    /// Whether either side of the pair is `code`.
    #[must_use]
    pub fn contains_currency(&self, code: &CurrencyCode) -> bool {
        &self.first == code || &self.second == code
    }

    /// Strict order match: `BTC-USD` matches only `BTC-USD`.
    #[must_use]
    pub fn matches_exact(&self, other: &CurrencyPair) -> bool {
        self.first == other.first && self.second == other.second
    }

    /// Order-agnostic match: `BTC-USD` also matches `USD-BTC`.
    #[must_use]
    pub fn matches_either_order(&self, other: &CurrencyPair) -> bool {
        self.matches_exact(other) || (self.first == other.second && self.second == other.first)
    }

    /// Match under the given mode.
    #[must_use]
    pub fn matches(&self, other: &CurrencyPair, mode: PairMatch) -> bool {
        match mode {
            PairMatch::Exact => self.matches_exact(other),
            PairMatch::EitherOrder => self.matches_either_order(other),
        }
    }

    /// Render with an explicit delimiter and case.
    #[must_use]
    pub fn display(&self, delimiter: &str, uppercase: bool) -> String {
        let rendered = format!("{}{}{}", self.first, delimiter, self.second);
        if uppercase {
            rendered
        } else {
            rendered.to_ascii_lowercase()
        }
    }

    /// Render with a configured display format.
    #[must_use]
    pub fn format(&self, format: &DisplayFormat) -> String {
        self.display(&format.delimiter, format.uppercase)
    }

    /// Concatenated symbol without any delimiter (`BTCUSD`).
    #[must_use]
    pub fn symbol(&self) -> String {
        self.display("", true)
    }
}

impl PartialEq for CurrencyPair {
    fn eq(&self, other: &Self) -> bool {
        self.matches_exact(other)
    }
}

impl Eq for CurrencyPair {}

impl Hash for CurrencyPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.first.hash(state);
        self.second.hash(state);
    }
}

impl PartialOrd for CurrencyPair {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CurrencyPair {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.first, &self.second).cmp(&(&other.first, &other.second))
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, self.delimiter, self.second)
    }
}

impl FromStr for CurrencyPair {
    type Err = Error;

    /// Parse `BTC-USD`, `btc_usd`, `BTC/USD` or a bare `BTCUSD`.
    ///
    /// Bare symbols are split after the third character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(delimiter) = KNOWN_DELIMITERS.iter().find(|d| trimmed.contains(**d)) {
            return Self::from_delimited(trimmed, delimiter);
        }
        if trimmed.len() <= 3 || !trimmed.is_ascii() {
            return Err(parse_error(s, "expected a delimiter or a symbol longer than 3 characters"));
        }
        let (first, second) = trimmed.split_at(3);
        Self::checked(s, first, second, DEFAULT_DELIMITER)
    }
}

fn parse_error(input: &str, reason: impl Into<String>) -> Error {
    Error::PairParse {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Equality mode used when deduplicating or searching pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairMatch {
    /// `(first, second)` must match in order.
    #[default]
    Exact,
    /// `(first, second)` may match in either order.
    EitherOrder,
}

/// An insertion-ordered sequence of pairs with no duplicates.
///
/// What counts as a duplicate is fixed by the [`PairMatch`] mode chosen at
/// construction. Membership is a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairSet {
    pairs: Vec<CurrencyPair>,
    #[serde(skip)]
    mode: PairMatch,
}

impl PairSet {
    #[must_use]
    pub fn new(mode: PairMatch) -> Self {
        Self {
            pairs: Vec::new(),
            mode,
        }
    }

    /// A set deduplicating by strict order.
    #[must_use]
    pub fn exact() -> Self {
        Self::new(PairMatch::Exact)
    }

    /// A set deduplicating regardless of order.
    #[must_use]
    pub fn either_order() -> Self {
        Self::new(PairMatch::EitherOrder)
    }

    /// Collect pairs into a set with the given mode, dropping duplicates.
    pub fn from_pairs(mode: PairMatch, pairs: impl IntoIterator<Item = CurrencyPair>) -> Self {
        let mut set = Self::new(mode);
        set.extend(pairs);
        set
    }

    #[must_use]
    pub fn mode(&self) -> PairMatch {
        self.mode
    }

    /// Append `pair` unless an equal pair is already present.
    ///
    /// Returns whether the pair was inserted.
    pub fn insert(&mut self, pair: CurrencyPair) -> bool {
        if self.contains(&pair) {
            return false;
        }
        self.pairs.push(pair);
        true
    }

    /// Membership under this set's mode.
    #[must_use]
    pub fn contains(&self, pair: &CurrencyPair) -> bool {
        self.pairs.iter().any(|p| p.matches(pair, self.mode))
    }

    /// Drop every pair that contains `code` on either side.
    pub fn retain_without_currency(&mut self, code: &CurrencyCode) {
        self.pairs.retain(|p| !p.contains_currency(code));
    }

    pub fn retain(&mut self, f: impl FnMut(&CurrencyPair) -> bool) {
        self.pairs.retain(f);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurrencyPair> {
        self.pairs.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CurrencyPair] {
        &self.pairs
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<CurrencyPair> {
        self.pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Extend<CurrencyPair> for PairSet {
    fn extend<T: IntoIterator<Item = CurrencyPair>>(&mut self, iter: T) {
        for pair in iter {
            self.insert(pair);
        }
    }
}

impl IntoIterator for PairSet {
    type Item = CurrencyPair;
    type IntoIter = std::vec::IntoIter<CurrencyPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a> IntoIterator for &'a PairSet {
    type Item = &'a CurrencyPair;
    type IntoIter = std::slice::Iter<'a, CurrencyPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// How an exchange spells its pairs for one asset type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFormat {
    pub delimiter: String,
    pub index: Option<String>,
    pub uppercase: bool,
}

impl PairFormat {
    /// Parse an exchange-native pair string.
    ///
    /// Splits on the delimiter when the input contains it, then falls back
    /// to the index currency, then to a three character split.
    pub fn parse(&self, input: &str) -> Result<CurrencyPair, Error> {
        if !self.delimiter.is_empty() && input.contains(self.delimiter.as_str()) {
            return CurrencyPair::from_delimited(input, &self.delimiter);
        }
        if let Some(index) = self.index.as_deref().filter(|i| !i.is_empty()) {
            return CurrencyPair::from_index(input, index);
        }
        input.parse()
    }

    /// Whether `input` carries this format's delimiter or index currency.
    #[must_use]
    pub fn accepts(&self, input: &str) -> bool {
        if let Some(index) = self.index.as_deref().filter(|i| !i.is_empty()) {
            return input.to_ascii_uppercase().contains(&index.to_ascii_uppercase());
        }
        !self.delimiter.is_empty() && input.contains(self.delimiter.as_str())
    }

    /// Render a pair the way the exchange expects it.
    #[must_use]
    pub fn render(&self, pair: &CurrencyPair) -> String {
        let delimiter = if self.index.is_some() {
            ""
        } else {
            self.delimiter.as_str()
        };
        pair.display(delimiter, self.uppercase)
    }
}

impl Default for PairFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            index: None,
            uppercase: true,
        }
    }
}

/// Process-wide display format for pairs in logs and relayed payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    pub delimiter: String,
    pub uppercase: bool,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            uppercase: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(s: &str) -> CurrencyPair {
        s.parse().unwrap()
    }

    #[test]
    fn parses_known_delimiters() {
        assert_eq!(pair("btc-usd"), CurrencyPair::new("BTC", "USD"));
        assert_eq!(pair("ETH_BTC"), CurrencyPair::new("ETH", "BTC"));
        assert_eq!(pair("XRP/EUR").delimiter(), "/");
    }

    #[test]
    fn parses_bare_symbol_after_third_char() {
        let parsed = pair("LTCUSDT");
        assert_eq!(parsed.first().as_str(), "LTC");
        assert_eq!(parsed.second().as_str(), "USDT");
    }

    #[test]
    fn rejects_short_or_half_empty_input() {
        assert!("BTC".parse::<CurrencyPair>().is_err());
        assert!("BTC-".parse::<CurrencyPair>().is_err());
        assert!(CurrencyPair::from_delimited("BTCUSD", "-").is_err());
    }

    #[test]
    fn index_split_handles_leading_and_trailing_index() {
        let trailing = CurrencyPair::from_index("DASHUSD", "USD").unwrap();
        assert_eq!(trailing, CurrencyPair::new("DASH", "USD"));

        let leading = CurrencyPair::from_index("usdbtc", "USD").unwrap();
        assert_eq!(leading, CurrencyPair::new("USD", "BTC"));

        assert!(CurrencyPair::from_index("BTCEUR", "USD").is_err());
    }

    #[test]
    fn equality_ignores_delimiter_but_not_order() {
        let a = CurrencyPair::with_delimiter("BTC", "USD", "_");
        let b = CurrencyPair::new("btc", "usd");
        assert_eq!(a, b);
        assert_ne!(a, b.swap());
        assert!(a.matches_either_order(&b.swap()));
        assert!(!a.matches_exact(&b.swap()));
    }

    #[test]
    fn display_respects_case_and_delimiter() {
        let p = CurrencyPair::new("BTC", "USD");
        assert_eq!(p.to_string(), "BTC-USD");
        assert_eq!(p.display("_", false), "btc_usd");
        assert_eq!(p.symbol(), "BTCUSD");
    }

    #[test]
    fn pair_set_dedups_by_mode() {
        let btc_usd = CurrencyPair::new("BTC", "USD");

        let mut exact = PairSet::exact();
        assert!(exact.insert(btc_usd.clone()));
        assert!(!exact.insert(CurrencyPair::with_delimiter("BTC", "USD", "/")));
        assert!(exact.insert(btc_usd.swap()));
        assert_eq!(exact.len(), 2);

        let mut either = PairSet::either_order();
        either.extend([btc_usd.clone(), btc_usd.swap()]);
        assert_eq!(either.as_slice(), &[btc_usd]);
    }

    #[test]
    fn pair_set_preserves_insertion_order() {
        let set = PairSet::from_pairs(
            PairMatch::Exact,
            [pair("LTC-USD"), pair("BTC-USD"), pair("LTC-USD"), pair("ETH-BTC")],
        );
        let rendered: Vec<String> = set.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["LTC-USD", "BTC-USD", "ETH-BTC"]);
    }

    #[test]
    fn retain_without_currency_drops_both_sides() {
        let mut set = PairSet::from_pairs(
            PairMatch::Exact,
            [pair("BTC-USDT"), pair("USDT-ETH"), pair("BTC-USD")],
        );
        set.retain_without_currency(&"USDT".into());
        assert_eq!(set.as_slice(), &[pair("BTC-USD")]);
    }

    #[test]
    fn pair_format_falls_back_from_delimiter_to_index() {
        let format = PairFormat {
            delimiter: "_".into(),
            index: Some("BTC".into()),
            uppercase: false,
        };
        assert_eq!(format.parse("eth_btc").unwrap(), pair("ETH-BTC"));
        assert_eq!(format.parse("LTCBTC").unwrap(), pair("LTC-BTC"));
        assert!(format.accepts("LTCBTC"));
        assert!(!format.accepts("LTCUSD"));
        assert_eq!(format.render(&pair("LTC-BTC")), "ltcbtc");
    }
}
