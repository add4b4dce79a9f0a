//! Relay adapter over a tokio broadcast channel.
//!
//! Each [`RelayEvent`] is serialized to JSON once and fanned out to every
//! subscriber. A subscriber that falls behind by more than the channel
//! capacity sees `RecvError::Lagged` and skips ahead.

use tokio::sync::broadcast;
use tracing::trace;

use crate::error::Result;
use crate::port::outbound::broadcast::{Broadcaster, RelayEvent};

/// Default relay buffer size.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<String>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Receive every relayed event as a JSON string.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn broadcast(&self, event: RelayEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        if self.tx.send(payload).is_err() {
            // No subscribers is not an error.
            trace!(exchange = %event.exchange, "No relay subscribers");
        }
        Ok(())
    }
}
