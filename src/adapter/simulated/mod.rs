//! Paper exchange integration.
//!
//! [`SimulatedExchange`] serves the pairs listed in an exchange's config
//! with prices derived from the pair itself, so a run with the same config
//! always produces the same sequence of quotes. [`SimulatedFeed`] streams
//! those quotes as websocket events.

mod exchange;
mod feed;
mod price;

pub use exchange::SimulatedExchange;
pub use feed::SimulatedFeed;
