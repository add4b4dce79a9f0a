//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies such as exchanges,
//! streaming feeds, relay subscribers, and the portfolio ledger.

pub mod broadcast;
pub mod exchange;
pub mod portfolio;
pub mod stream;
