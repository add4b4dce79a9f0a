//! Order book types for market depth representation.
//!
//! An order book has two sides:
//! - **Bids**: buy orders, sorted by price descending (best bid first)
//! - **Asks**: sell orders, sorted by price ascending (best ask first)
//!
//! # Examples
//!
//! ```
//! use arbiter::domain::asset::AssetType;
//! use arbiter::domain::book::{OrderBook, PriceLevel};
//! use arbiter::domain::pair::CurrencyPair;
//! use rust_decimal_macros::dec;
//!
//! let book = OrderBook::with_levels(
//!     CurrencyPair::new("BTC", "USD"),
//!     AssetType::Spot,
//!     vec![PriceLevel::new(dec!(99), dec!(1)), PriceLevel::new(dec!(100), dec!(2))],
//!     vec![PriceLevel::new(dec!(101), dec!(1))],
//! );
//!
//! assert_eq!(book.best_bid().unwrap().price, dec!(100));
//! assert_eq!(book.best_ask().unwrap().price, dec!(101));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::AssetType;
use super::pair::CurrencyPair;

/// Aggregated size resting at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

impl PriceLevel {
    #[must_use]
    pub const fn new(price: Decimal, amount: Decimal) -> Self {
        Self { price, amount }
    }
}

/// Depth snapshot for one pair on one exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub pair: CurrencyPair,
    pub asset: AssetType,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    pub updated_at: DateTime<Utc>,
}

impl OrderBook {
    #[must_use]
    pub fn new(pair: CurrencyPair, asset: AssetType) -> Self {
        Self::with_levels(pair, asset, Vec::new(), Vec::new())
    }

    /// Build a book, sorting each side best price first.
    #[must_use]
    pub fn with_levels(
        pair: CurrencyPair,
        asset: AssetType,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        let mut book = Self {
            pair,
            asset,
            bids,
            asks,
            updated_at: Utc::now(),
        };
        book.sort();
        book
    }

    fn sort(&mut self) {
        self.bids.sort_by(|a, b| b.price.cmp(&a.price));
        self.asks.sort_by(|a, b| a.price.cmp(&b.price));
    }

    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Total amount resting on the bid side.
    #[must_use]
    pub fn total_bids(&self) -> Decimal {
        self.bids.iter().map(|l| l.amount).sum()
    }

    #[must_use]
    pub fn total_asks(&self) -> Decimal {
        self.asks.iter().map(|l| l.amount).sum()
    }

    /// Apply an incremental update from a streaming feed.
    ///
    /// A level with zero amount removes that price, any other amount
    /// replaces or inserts it.
    pub fn apply_delta(&mut self, delta: &BookDelta) {
        merge_side(&mut self.bids, &delta.bids);
        merge_side(&mut self.asks, &delta.asks);
        self.sort();
        self.updated_at = delta.updated_at;
    }
}

fn merge_side(side: &mut Vec<PriceLevel>, updates: &[PriceLevel]) {
    for update in updates {
        side.retain(|level| level.price != update.price);
        if !update.amount.is_zero() {
            side.push(*update);
        }
    }
}

/// Incremental order book change pushed over a websocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDelta {
    pub pair: CurrencyPair,
    pub asset: AssetType,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> OrderBook {
        OrderBook::with_levels(
            CurrencyPair::new("BTC", "USD"),
            AssetType::Spot,
            vec![PriceLevel::new(dec!(100), dec!(1)), PriceLevel::new(dec!(99), dec!(2))],
            vec![PriceLevel::new(dec!(102), dec!(3)), PriceLevel::new(dec!(101), dec!(1))],
        )
    }

    #[test]
    fn levels_are_sorted_best_first() {
        let book = book();
        assert_eq!(book.best_bid().unwrap().price, dec!(100));
        assert_eq!(book.best_ask().unwrap().price, dec!(101));
        assert_eq!(book.total_bids(), dec!(3));
        assert_eq!(book.total_asks(), dec!(4));
    }

    #[test]
    fn delta_replaces_inserts_and_removes_levels() {
        let mut book = book();
        let delta = BookDelta {
            pair: book.pair.clone(),
            asset: AssetType::Spot,
            bids: vec![PriceLevel::new(dec!(100), dec!(0)), PriceLevel::new(dec!(98), dec!(5))],
            asks: vec![PriceLevel::new(dec!(101), dec!(4)), PriceLevel::new(dec!(100.5), dec!(1))],
            updated_at: Utc::now(),
        };

        book.apply_delta(&delta);

        assert_eq!(book.best_bid().unwrap().price, dec!(99));
        assert_eq!(book.bids().len(), 2);
        assert_eq!(book.best_ask(), Some(&PriceLevel::new(dec!(100.5), dec!(1))));
        assert_eq!(book.asks()[1].amount, dec!(4));
    }

    #[test]
    fn empty_book_has_no_best_levels() {
        let book = OrderBook::new(CurrencyPair::new("ETH", "USD"), AssetType::Spot);
        assert!(book.best_bid().is_none());
        assert_eq!(book.total_asks(), Decimal::ZERO);
    }
}
