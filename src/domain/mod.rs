//! Exchange-agnostic domain types.

pub mod account;
pub mod asset;
pub mod book;
pub mod currency;
pub mod order;
pub mod pair;
pub mod ticker;
pub mod translation;

pub use account::{Account, AccountCurrencyInfo, AccountInfo};
pub use asset::AssetType;
pub use book::{BookDelta, OrderBook, PriceLevel};
pub use currency::{CurrencyClasses, CurrencyCode};
pub use pair::{CurrencyPair, DisplayFormat, PairFormat, PairMatch, PairSet};
pub use ticker::Ticker;
