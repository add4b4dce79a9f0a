//! Application services (use cases).
//!
//! These services orchestrate domain logic and the outbound ports:
//!
//! - [`aggregate::Engine`]: the aggregation root shared by every task
//! - [`registry::ExchangeRegistry`]: synchronized per-exchange live state
//! - [`relation::PairRelations`]: pair relatability queries
//! - [`cache`]: ticker and order book caches
//! - [`stats::PriceStats`]: cross-exchange price observations
//! - [`account`]: balance collation and portfolio reconciliation

pub mod account;
pub mod aggregate;
pub mod cache;
pub mod portfolio;
pub mod registry;
pub mod relation;
pub mod stats;

pub use aggregate::Engine;
pub use registry::{ExchangeEntry, ExchangeRegistry, PairStore};
pub use relation::PairRelations;
