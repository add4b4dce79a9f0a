//! Websocket routine and relay settings.

use std::time::Duration;

use serde::Deserialize;

use crate::runtime::websocket::SupervisorConfig;

/// `[websocket]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WebsocketConfig {
    /// Relay polled and streamed data to downstream subscribers.
    #[serde(default)]
    pub server_enabled: bool,
    /// Start streaming feeds for exchanges that have them.
    #[serde(default = "default_true")]
    pub routine_enabled: bool,
    /// Fixed delay between reconnect attempts (milliseconds).
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Upper bound on waiting for routines to stop (milliseconds).
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// Give up after this many failed reconnects. Unlimited when unset.
    #[serde(default)]
    pub max_reconnect_attempts: Option<u32>,
    /// Per-exchange inbound event buffer.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Relay channel buffer for slow subscribers.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    3000
}

fn default_shutdown_timeout_ms() -> u64 {
    5000
}

fn default_channel_capacity() -> usize {
    256
}

fn default_broadcast_capacity() -> usize {
    1024
}

impl WebsocketConfig {
    #[must_use]
    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            reconnect_interval: Duration::from_millis(self.reconnect_interval_ms),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
            max_reconnect_attempts: self.max_reconnect_attempts,
            channel_capacity: self.channel_capacity,
            relay: self.server_enabled,
        }
    }
}

impl Default for WebsocketConfig {
    fn default() -> Self {
        Self {
            server_enabled: false,
            routine_enabled: true,
            reconnect_interval_ms: default_reconnect_interval_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            max_reconnect_attempts: None,
            channel_capacity: default_channel_capacity(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}
