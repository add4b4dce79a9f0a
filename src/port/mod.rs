//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams where concrete exchange integrations, relay
//! transports and portfolio storage plug into the aggregation core.
//!
//! # Available Ports
//!
//! - [`Exchange`] - Per-exchange capability contract (REST market data,
//!   tradable pairs, account info, order pass-throughs)
//! - [`WebsocketConnection`], [`StreamEvent`] - Streaming feed contract
//! - [`Broadcaster`] - Downstream relay of fresh tickers and order books
//! - [`PortfolioLedger`] - Persisted exchange balance addresses

pub mod outbound;

pub use outbound::broadcast::{Broadcaster, RelayEvent, RelayKind, RelayPayload};
pub use outbound::exchange::Exchange;
pub use outbound::portfolio::{PortfolioAddress, PortfolioLedger};
pub use outbound::stream::{StreamError, StreamEvent, WebsocketConnection};
