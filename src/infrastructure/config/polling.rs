//! REST polling loop settings.

use std::time::Duration;

use serde::Deserialize;

/// `[polling]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_true")]
    pub ticker_enabled: bool,
    #[serde(default = "default_true")]
    pub orderbook_enabled: bool,
    /// Sleep between ticker passes (seconds).
    #[serde(default = "default_interval_secs")]
    pub ticker_interval_secs: u64,
    /// Sleep between order book passes (seconds).
    #[serde(default = "default_interval_secs")]
    pub orderbook_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    10
}

impl PollingConfig {
    #[must_use]
    pub fn ticker_interval(&self) -> Duration {
        Duration::from_secs(self.ticker_interval_secs)
    }

    #[must_use]
    pub fn orderbook_interval(&self) -> Duration {
        Duration::from_secs(self.orderbook_interval_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            ticker_enabled: true,
            orderbook_enabled: true,
            ticker_interval_secs: default_interval_secs(),
            orderbook_interval_secs: default_interval_secs(),
        }
    }
}
