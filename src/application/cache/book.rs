//! Thread-safe order book cache with optional update notifications.

use dashmap::DashMap;
use tokio::sync::broadcast;

use super::MarketKey;
use crate::domain::asset::AssetType;
use crate::domain::book::{BookDelta, OrderBook};
use crate::domain::pair::CurrencyPair;

/// Notification sent when a book is updated.
#[derive(Debug, Clone)]
pub struct BookUpdate {
    pub key: MarketKey,
}

/// Latest order book per exchange, pair and asset type.
pub struct OrderbookCache {
    books: DashMap<MarketKey, OrderBook>,
    /// Wrapped in Option to allow construction without notifications.
    tx: Option<broadcast::Sender<BookUpdate>>,
}

impl OrderbookCache {
    /// Create a new cache without notifications.
    #[must_use]
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
            tx: None,
        }
    }

    /// Create a new cache with broadcast notifications.
    ///
    /// Returns the cache and a receiver for subscribing to updates.
    #[must_use]
    pub fn with_notifications(capacity: usize) -> (Self, broadcast::Receiver<BookUpdate>) {
        let (tx, rx) = broadcast::channel(capacity);
        let cache = Self {
            books: DashMap::new(),
            tx: Some(tx),
        };
        (cache, rx)
    }

    /// Returns `None` if the cache was created without notifications.
    #[must_use]
    pub fn subscribe(&self) -> Option<broadcast::Receiver<BookUpdate>> {
        self.tx.as_ref().map(|tx| tx.subscribe())
    }

    /// Replace the cached book and notify subscribers.
    pub fn put(&self, exchange: &str, book: OrderBook) {
        let key = MarketKey::new(exchange, &book.pair, book.asset);
        self.books.insert(key.clone(), book);
        self.notify(key);
    }

    #[must_use]
    pub fn get(&self, exchange: &str, pair: &CurrencyPair, asset: AssetType) -> Option<OrderBook> {
        self.books
            .get(&MarketKey::new(exchange, pair, asset))
            .map(|entry| entry.value().clone())
    }

    /// Apply a streaming delta to a cached book.
    ///
    /// Returns false when no snapshot exists yet; the delta is dropped.
    pub fn apply_delta(&self, exchange: &str, delta: &BookDelta) -> bool {
        let key = MarketKey::new(exchange, &delta.pair, delta.asset);
        let applied = match self.books.get_mut(&key) {
            Some(mut book) => {
                book.apply_delta(delta);
                true
            }
            None => false,
        };
        if applied {
            self.notify(key);
        }
        applied
    }

    /// All cached books for one exchange.
    #[must_use]
    pub fn for_exchange(&self, exchange: &str) -> Vec<OrderBook> {
        let exchange = exchange.to_ascii_lowercase();
        self.books
            .iter()
            .filter(|entry| entry.key().exchange == exchange)
            .map(|entry| entry.value().clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn notify(&self, key: MarketKey) {
        // No receivers is fine
        if let Some(ref tx) = self.tx {
            let _ = tx.send(BookUpdate { key });
        }
    }
}

impl Default for OrderbookCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::PriceLevel;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn book(pair: &CurrencyPair) -> OrderBook {
        OrderBook::with_levels(
            pair.clone(),
            AssetType::Spot,
            vec![PriceLevel::new(dec!(100), dec!(1))],
            vec![PriceLevel::new(dec!(101), dec!(1))],
        )
    }

    #[test]
    fn test_put_and_get() {
        let cache = OrderbookCache::new();
        let pair = CurrencyPair::new("BTC", "USD");
        cache.put("alpha", book(&pair));

        let cached = cache.get("ALPHA", &pair, AssetType::Spot).unwrap();
        assert_eq!(cached.best_bid().unwrap().price, dec!(100));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delta_without_snapshot_is_dropped() {
        let cache = OrderbookCache::new();
        let delta = BookDelta {
            pair: CurrencyPair::new("BTC", "USD"),
            asset: AssetType::Spot,
            bids: vec![PriceLevel::new(dec!(100), dec!(1))],
            asks: vec![],
            updated_at: Utc::now(),
        };
        assert!(!cache.apply_delta("alpha", &delta));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delta_updates_snapshot_and_notifies() {
        let (cache, mut rx) = OrderbookCache::with_notifications(8);
        let pair = CurrencyPair::new("BTC", "USD");
        cache.put("alpha", book(&pair));
        let _ = rx.try_recv();

        let delta = BookDelta {
            pair: pair.clone(),
            asset: AssetType::Spot,
            bids: vec![PriceLevel::new(dec!(100.5), dec!(2))],
            asks: vec![],
            updated_at: Utc::now(),
        };
        assert!(cache.apply_delta("alpha", &delta));

        let update = rx.try_recv().unwrap();
        assert_eq!(update.key.exchange, "alpha");
        let cached = cache.get("alpha", &pair, AssetType::Spot).unwrap();
        assert_eq!(cached.best_bid().unwrap().price, dec!(100.5));
    }
}
