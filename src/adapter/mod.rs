//! Implementations of ports (hexagonal adapters).
//!
//! - [`broadcast::ChannelBroadcaster`] - JSON relay over a tokio broadcast channel
//! - [`simulated`] - Paper exchange and streaming feed used by the binary

pub mod broadcast;
pub mod simulated;
