//! Runtime caches for the latest market data.
//!
//! Both caches are keyed by [`MarketKey`] and use a sharded map so writes
//! for different exchanges never contend on one lock:
//!
//! - [`ticker::TickerCache`]: latest ticker per exchange/pair/asset
//! - [`book::OrderbookCache`]: latest order book per exchange/pair/asset

pub mod book;
pub mod key;
pub mod ticker;

pub use book::OrderbookCache;
pub use key::MarketKey;
pub use ticker::TickerCache;
