//! Thread-safe ticker cache.

use dashmap::DashMap;

use super::MarketKey;
use crate::domain::asset::AssetType;
use crate::domain::pair::CurrencyPair;
use crate::domain::ticker::Ticker;

/// Latest ticker per exchange, pair and asset type.
#[derive(Debug, Default)]
pub struct TickerCache {
    tickers: DashMap<MarketKey, Ticker>,
}

impl TickerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a ticker under its own pair and asset type.
    pub fn put(&self, exchange: &str, ticker: Ticker) {
        let key = MarketKey::new(exchange, &ticker.pair, ticker.asset);
        self.tickers.insert(key, ticker);
    }

    /// Get a snapshot of a cached ticker.
    #[must_use]
    pub fn get(&self, exchange: &str, pair: &CurrencyPair, asset: AssetType) -> Option<Ticker> {
        self.tickers
            .get(&MarketKey::new(exchange, pair, asset))
            .map(|entry| entry.value().clone())
    }

    /// All cached tickers for one exchange.
    #[must_use]
    pub fn for_exchange(&self, exchange: &str) -> Vec<Ticker> {
        let exchange = exchange.to_ascii_lowercase();
        self.tickers
            .iter()
            .filter(|entry| entry.key().exchange == exchange)
            .map(|entry| entry.value().clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn put_and_get_ignore_exchange_case() {
        let cache = TickerCache::new();
        let pair = CurrencyPair::new("BTC", "USD");
        cache.put("Alpha", Ticker::new(pair.clone(), AssetType::Spot, dec!(100)));

        let ticker = cache.get("ALPHA", &pair, AssetType::Spot).unwrap();
        assert_eq!(ticker.last, dec!(100));
        assert!(cache.get("alpha", &pair, AssetType::Futures).is_none());
        assert!(cache.get("alpha", &pair.swap(), AssetType::Spot).is_none());
    }

    #[test]
    fn newer_ticker_replaces_older() {
        let cache = TickerCache::new();
        let pair = CurrencyPair::new("BTC", "USD");
        cache.put("alpha", Ticker::new(pair.clone(), AssetType::Spot, dec!(100)));
        cache.put("alpha", Ticker::new(pair.clone(), AssetType::Spot, dec!(101)));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("alpha", &pair, AssetType::Spot).unwrap().last, dec!(101));
    }

    #[test]
    fn for_exchange_filters_by_name() {
        let cache = TickerCache::new();
        cache.put("alpha", Ticker::new(CurrencyPair::new("BTC", "USD"), AssetType::Spot, dec!(1)));
        cache.put("beta", Ticker::new(CurrencyPair::new("BTC", "USD"), AssetType::Spot, dec!(2)));

        let alpha = cache.for_exchange("Alpha");
        assert_eq!(alpha.len(), 1);
        assert_eq!(alpha[0].last, dec!(1));
    }
}
