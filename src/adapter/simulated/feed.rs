use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::price::quote;
use crate::domain::asset::AssetType;
use crate::domain::pair::CurrencyPair;
use crate::domain::ticker::Ticker;
use crate::error::Result;
use crate::port::outbound::stream::{StreamEvent, WebsocketConnection};

const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Streams simulated tickers for every listed pair.
pub struct SimulatedFeed {
    name: String,
    pairs: BTreeMap<AssetType, Vec<CurrencyPair>>,
    interval: Duration,
    enabled: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedFeed {
    pub fn new(name: &str, pairs: BTreeMap<AssetType, Vec<CurrencyPair>>) -> Self {
        Self {
            name: name.to_string(),
            pairs,
            interval: DEFAULT_PUSH_INTERVAL,
            enabled: AtomicBool::new(true),
            task: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether a push task is currently running.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl WebsocketConnection for SimulatedFeed {
    fn exchange_name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn connect(&self, events: mpsc::Sender<StreamEvent>) -> Result<()> {
        let pairs: Vec<(AssetType, CurrencyPair)> = self
            .pairs
            .iter()
            .flat_map(|(asset, pairs)| pairs.iter().map(move |p| (*asset, p.clone())))
            .collect();
        let period = self.interval;
        let name = self.name.clone();

        let task = tokio::spawn(async move {
            if events.send(StreamEvent::Connected).await.is_err() {
                return;
            }
            let mut ticker = tokio::time::interval(period);
            let mut tick: u64 = 0;
            loop {
                ticker.tick().await;
                tick += 1;
                for (asset, pair) in &pairs {
                    let event = StreamEvent::Ticker(Ticker::new(pair.clone(), *asset, quote(pair, tick)));
                    if events.send(event).await.is_err() {
                        debug!(exchange = %name, "Simulated feed receiver dropped");
                        return;
                    }
                }
            }
        });

        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        Ok(())
    }
}
