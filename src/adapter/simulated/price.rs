//! Deterministic reference prices.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::book::PriceLevel;
use crate::domain::currency::CurrencyCode;
use crate::domain::pair::CurrencyPair;

/// Quotes oscillate within this many basis points of the reference.
const SWING_BPS: u64 = 10;
const BOOK_DEPTH: u32 = 5;

/// Rough USD value of a currency; unknown codes are worth 1.
fn usd_value(code: &CurrencyCode) -> Decimal {
    match code.as_str() {
        "BTC" | "XBT" => dec!(60000),
        "ETH" | "XETH" => dec!(3000),
        "LTC" => dec!(80),
        "DASH" => dec!(30),
        "XRP" => dec!(0.5),
        "DOGE" | "XDG" => dec!(0.1),
        "PPC" | "NMC" | "NVC" => dec!(0.4),
        "EUR" => dec!(1.08),
        "GBP" => dec!(1.27),
        "AUD" => dec!(0.66),
        "CAD" => dec!(0.73),
        "CNY" => dec!(0.14),
        "JPY" => dec!(0.0067),
        _ => Decimal::ONE,
    }
}

/// Price of `pair` after `tick` updates.
pub(super) fn quote(pair: &CurrencyPair, tick: u64) -> Decimal {
    let reference = usd_value(pair.first())
        .checked_div(usd_value(pair.second()))
        .unwrap_or(Decimal::ONE);
    let span = SWING_BPS * 2 + 1;
    let offset = Decimal::from(tick % span) - Decimal::from(SWING_BPS);
    let factor = Decimal::ONE + offset / dec!(10000);
    (reference * factor).round_dp(8)
}

/// Symmetric depth around `mid`, one basis point apart.
pub(super) fn depth(mid: Decimal) -> (Vec<PriceLevel>, Vec<PriceLevel>) {
    let step = (mid / dec!(10000)).round_dp(8);
    let step = if step.is_zero() { dec!(0.00000001) } else { step };
    let levels = 1..=BOOK_DEPTH;
    let bids = levels
        .clone()
        .map(|i| PriceLevel::new(mid - step * Decimal::from(i), Decimal::from(i)))
        .collect();
    let asks = levels
        .map(|i| PriceLevel::new(mid + step * Decimal::from(i), Decimal::from(i)))
        .collect();
    (bids, asks)
}
