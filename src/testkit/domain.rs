//! Builders for domain primitives used across tests.
//!
//! Concise factory functions for pairs, tickers, books and stream events so
//! tests focus on assertions rather than construction boilerplate.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::asset::AssetType;
use crate::domain::book::{BookDelta, OrderBook, PriceLevel};
use crate::domain::pair::CurrencyPair;
use crate::domain::ticker::Ticker;
use crate::port::outbound::stream::StreamEvent;

/// Parse a pair such as `"BTC-USD"`, panicking on bad input.
pub fn pair(s: &str) -> CurrencyPair {
    s.parse().unwrap_or_else(|e| panic!("invalid test pair {s}: {e}"))
}

pub fn pairs(list: &[&str]) -> Vec<CurrencyPair> {
    list.iter().map(|s| pair(s)).collect()
}

/// Spot ticker with every price field set to `last`.
pub fn ticker(p: &str, last: Decimal) -> Ticker {
    Ticker::new(pair(p), AssetType::Spot, last)
}

/// Spot book with one level per side.
pub fn book(p: &str, bid: Decimal, ask: Decimal) -> OrderBook {
    OrderBook::with_levels(
        pair(p),
        AssetType::Spot,
        vec![PriceLevel::new(bid, Decimal::ONE)],
        vec![PriceLevel::new(ask, Decimal::ONE)],
    )
}

/// Spot delta from `(price, amount)` tuples.
pub fn delta(p: &str, bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> BookDelta {
    BookDelta {
        pair: pair(p),
        asset: AssetType::Spot,
        bids: levels(bids),
        asks: levels(asks),
        updated_at: Utc::now(),
    }
}

fn levels(side: &[(Decimal, Decimal)]) -> Vec<PriceLevel> {
    side.iter()
        .map(|&(price, amount)| PriceLevel::new(price, amount))
        .collect()
}

/// Create a [`Ticker`](StreamEvent::Ticker) event.
pub fn ticker_event(p: &str, last: Decimal) -> StreamEvent {
    StreamEvent::Ticker(ticker(p, last))
}

/// Create a [`Disconnected`](StreamEvent::Disconnected) event.
pub fn disconnect_event(reason: &str) -> StreamEvent {
    StreamEvent::Disconnected {
        reason: reason.to_string(),
    }
}
