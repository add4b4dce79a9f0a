//! Arbiter - multi-exchange market data aggregation and pair relatability.
//!
//! The crate keeps ticker and order book caches fresh across many exchange
//! integrations and answers cross-exchange questions about currency pairs.
//!
//! # Architecture
//!
//! - **`domain`** - Exchange-agnostic value types: currencies, pairs, tickers,
//!   order books, accounts, orders, plus the static symbol translation table.
//! - **`port`** - Trait boundaries the core consumes: the [`Exchange`]
//!   capability trait, websocket connections, broadcast relay and the
//!   portfolio ledger.
//! - **`application`** - The aggregation root ([`Engine`]), exchange registry,
//!   caches, price stats and the pair relatability engine.
//! - **`runtime`** - Long-running tasks: the REST polling scheduler and the
//!   websocket supervisory loop.
//! - **`infrastructure`** - Configuration loading and engine bootstrap.
//! - **`adapter`** - Concrete collaborators (channel broadcaster, simulated
//!   exchange).
//!
//! # Example
//!
//! ```
//! use arbiter::application::relation::PairRelations;
//! use arbiter::domain::currency::CurrencyClasses;
//! use arbiter::domain::pair::CurrencyPair;
//!
//! let relations = PairRelations::new(CurrencyClasses::default());
//! let btc_usd = CurrencyPair::new("BTC", "USD");
//! let xbt_usd = CurrencyPair::new("XBT", "USD");
//!
//! assert!(relations.is_relatable_pairs(&btc_usd, &xbt_usd, false));
//! ```
//!
//! [`Exchange`]: port::outbound::exchange::Exchange
//! [`Engine`]: application::aggregate::Engine

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
pub mod runtime;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
