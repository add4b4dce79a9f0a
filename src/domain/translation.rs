//! Static currency symbol translation table.
//!
//! Some exchanges quote the same asset under a different ticker symbol
//! (Kraken's `XBT` for bitcoin, `XDG` for dogecoin). The table maps each
//! symbol to its counterpart in both directions. It is a compile-time
//! `match`, so lookups need no initialization and are safe from any thread.

use super::currency::CurrencyCode;

/// Translate a symbol to its equivalent, if the table has one.
///
/// `None` means no translation exists and the original symbol stands.
#[must_use]
pub fn translate(symbol: &CurrencyCode) -> Option<CurrencyCode> {
    let translated = match symbol.as_str() {
        "BTC" => "XBT",
        "XBT" => "BTC",
        "ETH" => "XETH",
        "XETH" => "ETH",
        "DOGE" => "XDG",
        "XDG" => "DOGE",
        "USD" => "USDT",
        "USDT" => "USD",
        _ => return None,
    };
    Some(CurrencyCode::from(translated))
}

/// Whether the table holds an entry for `symbol`.
#[must_use]
pub fn has_translation(symbol: &CurrencyCode) -> bool {
    translate(symbol).is_some()
}
