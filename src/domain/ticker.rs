//! Ticker snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::AssetType;
use super::pair::CurrencyPair;

/// Latest price summary for one pair on one exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub pair: CurrencyPair,
    pub asset: AssetType,
    pub last: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub volume: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Ticker {
    /// A ticker where every price field is `last` and volume is zero.
    #[must_use]
    pub fn new(pair: CurrencyPair, asset: AssetType, last: Decimal) -> Self {
        Self {
            pair,
            asset,
            last,
            high: last,
            low: last,
            bid: last,
            ask: last,
            volume: Decimal::ZERO,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = volume;
        self
    }

    /// Bid/ask spread, zero when either side is missing.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        if self.bid.is_zero() || self.ask.is_zero() {
            return Decimal::ZERO;
        }
        self.ask - self.bid
    }
}
