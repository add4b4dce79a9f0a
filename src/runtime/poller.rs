//! REST polling scheduler.
//!
//! Two structurally identical loops refresh the ticker and order book
//! caches. Each pass snapshots the registry, spawns one task per exchange
//! into a [`JoinSet`] and joins all of them before sleeping. A slow exchange
//! delays the pass but never cancels its siblings, and a failing exchange
//! only costs its own pairs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::application::aggregate::Engine;
use crate::application::registry::ExchangeEntry;
use crate::port::outbound::broadcast::RelayEvent;

/// Default sleep between passes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Outcome of one polling pass across every exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Exchange tasks launched.
    pub exchanges: usize,
    /// Exchanges skipped as disabled or without REST.
    pub skipped: usize,
    /// Pairs fetched and cached.
    pub updated: usize,
    /// Pairs whose fetch failed.
    pub failed: usize,
    /// Exchange tasks that panicked.
    pub panicked: usize,
}

impl PassReport {
    fn absorb(&mut self, outcome: TaskOutcome) {
        if outcome.skipped {
            self.skipped += 1;
        }
        self.updated += outcome.updated;
        self.failed += outcome.failed;
    }
}

#[derive(Debug, Default)]
struct TaskOutcome {
    skipped: bool,
    updated: usize,
    failed: usize,
}

impl TaskOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Drives the ticker and order book polling loops.
#[derive(Clone)]
pub struct Poller {
    engine: Arc<Engine>,
    interval: Duration,
    relay: bool,
}

impl Poller {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            interval: DEFAULT_POLL_INTERVAL,
            relay: false,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Relay fresh data to the engine's broadcaster after each cache write.
    #[must_use]
    pub fn with_relay(mut self, relay: bool) -> Self {
        self.relay = relay;
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll tickers forever.
    pub async fn run_ticker_updater(&self) {
        info!(interval_secs = self.interval.as_secs_f64(), "Ticker updater started");
        loop {
            let report = self.ticker_pass().await;
            debug!(?report, "Ticker pass complete");
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Poll order books forever.
    pub async fn run_orderbook_updater(&self) {
        info!(interval_secs = self.interval.as_secs_f64(), "Orderbook updater started");
        loop {
            let report = self.orderbook_pass().await;
            debug!(?report, "Orderbook pass complete");
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run one ticker pass and wait for every exchange task.
    pub async fn ticker_pass(&self) -> PassReport {
        let mut tasks = JoinSet::new();
        for entry in self.engine.registry().snapshot() {
            let engine = Arc::clone(&self.engine);
            let relay = self.relay;
            tasks.spawn(async move { poll_tickers(&engine, &entry, relay).await });
        }
        join_pass(tasks, "ticker").await
    }

    /// Run one order book pass and wait for every exchange task.
    pub async fn orderbook_pass(&self) -> PassReport {
        let mut tasks = JoinSet::new();
        for entry in self.engine.registry().snapshot() {
            let engine = Arc::clone(&self.engine);
            let relay = self.relay;
            tasks.spawn(async move { poll_orderbooks(&engine, &entry, relay).await });
        }
        join_pass(tasks, "orderbook").await
    }
}

async fn join_pass(mut tasks: JoinSet<TaskOutcome>, kind: &'static str) -> PassReport {
    let mut report = PassReport {
        exchanges: tasks.len(),
        ..PassReport::default()
    };
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => report.absorb(outcome),
            Err(e) => {
                error!(kind, error = %e, "Polling task failed");
                report.panicked += 1;
            }
        }
    }
    report
}

fn should_skip(entry: &ExchangeEntry) -> bool {
    !entry.is_enabled() || !entry.supports_rest()
}

async fn poll_tickers(engine: &Engine, entry: &ExchangeEntry, relay: bool) -> TaskOutcome {
    if should_skip(entry) {
        return TaskOutcome::skipped();
    }

    let batching = entry.supports_ticker_batching();
    let mut outcome = TaskOutcome::default();
    for asset in entry.asset_types() {
        for (index, pair) in entry.enabled_pairs(asset).iter().enumerate() {
            // With batching, the first pair's network call refreshes the
            // whole asset type, the rest read the cache it filled.
            let result = if batching && index > 0 {
                engine.fetch_ticker(entry, pair, asset).await
            } else {
                engine.update_ticker(entry, pair, asset).await
            };

            match result {
                Ok(ticker) => {
                    debug!(
                        exchange = %entry.name(),
                        pair = %engine.format_currency(pair),
                        asset = %asset,
                        last = %ticker.last,
                        "Ticker updated"
                    );
                    outcome.updated += 1;
                    if relay {
                        engine.relay(RelayEvent::ticker(entry.name(), ticker));
                    }
                }
                Err(e) => {
                    error!(
                        exchange = %entry.name(),
                        pair = %engine.format_currency(pair),
                        asset = %asset,
                        error = %e,
                        "Failed to update ticker"
                    );
                    outcome.failed += 1;
                }
            }
        }
    }
    outcome
}

async fn poll_orderbooks(engine: &Engine, entry: &ExchangeEntry, relay: bool) -> TaskOutcome {
    if should_skip(entry) {
        return TaskOutcome::skipped();
    }

    let mut outcome = TaskOutcome::default();
    for asset in entry.asset_types() {
        for pair in entry.enabled_pairs(asset) {
            match engine.update_orderbook(entry, &pair, asset).await {
                Ok(book) => {
                    debug!(
                        exchange = %entry.name(),
                        pair = %engine.format_currency(&pair),
                        asset = %asset,
                        bids = book.bids().len(),
                        asks = book.asks().len(),
                        "Orderbook updated"
                    );
                    outcome.updated += 1;
                    if relay {
                        engine.relay(RelayEvent::orderbook(entry.name(), book));
                    }
                }
                Err(e) => {
                    error!(
                        exchange = %entry.name(),
                        pair = %engine.format_currency(&pair),
                        asset = %asset,
                        error = %e,
                        "Failed to update orderbook"
                    );
                    outcome.failed += 1;
                }
            }
        }
    }
    outcome
}
