//! Cross-exchange price statistics fed by successful ticker fetches.

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::domain::asset::AssetType;
use crate::domain::currency::CurrencyCode;
use crate::domain::pair::CurrencyPair;
use crate::error::{Error, Result};

/// Last observed price and volume for one exchange/pair/asset.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStat {
    pub exchange: String,
    pub pair: CurrencyPair,
    pub asset: AssetType,
    pub price: Decimal,
    pub volume: Decimal,
}

/// Thread-safe table of the latest price per exchange.
#[derive(Debug, Default)]
pub struct PriceStats {
    items: RwLock<Vec<PriceStat>>,
}

impl PriceStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a price observation.
    ///
    /// Zero price or volume is ignored. `XBT` quotes are also recorded as
    /// `BTC` and `USDT` quotes as `USD`, so lookups by the common symbol find
    /// exchanges that use the alternate one.
    pub fn add(
        &self,
        exchange: &str,
        pair: &CurrencyPair,
        asset: AssetType,
        price: Decimal,
        volume: Decimal,
    ) {
        if price.is_zero() || volume.is_zero() {
            return;
        }

        let mut items = self.items.write();
        upsert(&mut items, exchange, pair.clone(), asset, price, volume);

        if pair.first() == "XBT" {
            let alias = CurrencyPair::new(CurrencyCode::from("BTC"), pair.second());
            upsert(&mut items, exchange, alias, asset, price, volume);
        }
        if pair.second() == "USDT" {
            let alias = CurrencyPair::new(pair.first(), CurrencyCode::from("USD"));
            upsert(&mut items, exchange, alias, asset, price, volume);
        }
    }

    /// Observations for a pair, highest price first.
    #[must_use]
    pub fn sorted_by_price(&self, pair: &CurrencyPair, asset: AssetType) -> Vec<PriceStat> {
        let mut matching: Vec<PriceStat> = self
            .items
            .read()
            .iter()
            .filter(|s| s.asset == asset && s.pair.matches_exact(pair))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.price.cmp(&a.price));
        matching
    }

    /// Name of the exchange quoting the highest last price.
    pub fn exchange_with_highest_price(
        &self,
        pair: &CurrencyPair,
        asset: AssetType,
    ) -> Result<String> {
        self.sorted_by_price(pair, asset)
            .into_iter()
            .next()
            .map(|s| s.exchange)
            .ok_or_else(|| no_stats(pair, asset))
    }

    /// Name of the exchange quoting the lowest last price.
    pub fn exchange_with_lowest_price(
        &self,
        pair: &CurrencyPair,
        asset: AssetType,
    ) -> Result<String> {
        self.sorted_by_price(pair, asset)
            .pop()
            .map(|s| s.exchange)
            .ok_or_else(|| no_stats(pair, asset))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

fn upsert(
    items: &mut Vec<PriceStat>,
    exchange: &str,
    pair: CurrencyPair,
    asset: AssetType,
    price: Decimal,
    volume: Decimal,
) {
    let existing = items.iter_mut().find(|s| {
        s.asset == asset && s.pair.matches_exact(&pair) && s.exchange.eq_ignore_ascii_case(exchange)
    });
    match existing {
        Some(stat) => {
            stat.price = price;
            stat.volume = volume;
        }
        None => items.push(PriceStat {
            exchange: exchange.to_string(),
            pair,
            asset,
            price,
            volume,
        }),
    }
}

fn no_stats(pair: &CurrencyPair, asset: AssetType) -> Error {
    Error::NoPriceStats {
        pair: pair.to_string(),
        asset,
    }
}
