//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`exchange`]: Mock [`Exchange`](crate::port::outbound::exchange::Exchange):
//!   `ScriptedExchange`.
//! - [`stream`]: Mock [`WebsocketConnection`](crate::port::outbound::stream::WebsocketConnection):
//!   `ScriptedWebsocket`.
//! - [`domain`]: Builders for domain primitives: pairs, tickers, books, events.
//! - [`engine`]: Registry entries and engines over scripted exchanges.

pub mod domain;
pub mod engine;
pub mod exchange;
pub mod stream;
