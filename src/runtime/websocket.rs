//! Websocket supervisory loop.
//!
//! One dispatch task per streaming exchange consumes that exchange's event
//! channel and branches on the event kind. An abnormal closure (1006) hands
//! the connection to a separate reconnect task, so dispatch keeps servicing
//! events while the reconnect is pending.
//!
//! Every task watches a shared shutdown signal. [`WebsocketSupervisor::shutdown`]
//! flips it and waits for all tasks up to a fixed timeout; a timeout is
//! returned as [`Error::ShutdownTimeout`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::application::aggregate::Engine;
use crate::error::{Error, Result};
use crate::port::outbound::broadcast::RelayEvent;
use crate::port::outbound::stream::{StreamEvent, WebsocketConnection};

/// Connection state of one streaming exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Reconnect attempts exhausted; the feed stays down.
    Failed,
}

/// Supervisor timing and capacity settings.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub reconnect_interval: Duration,
    pub shutdown_timeout: Duration,
    /// `None` retries until success or shutdown.
    pub max_reconnect_attempts: Option<u32>,
    pub channel_capacity: usize,
    /// Relay streamed tickers and books to the engine's broadcaster.
    pub relay: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            reconnect_interval: Duration::from_secs(3),
            shutdown_timeout: Duration::from_secs(5),
            max_reconnect_attempts: None,
            channel_capacity: 256,
            relay: false,
        }
    }
}

struct Feed {
    name: String,
    connection: Arc<dyn WebsocketConnection>,
    state: RwLock<FeedState>,
    reconnecting: AtomicBool,
    events: mpsc::Sender<StreamEvent>,
}

impl Feed {
    fn state(&self) -> FeedState {
        *self.state.read()
    }

    fn set_state(&self, state: FeedState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous != state {
            debug!(exchange = %self.name, from = ?previous, to = ?state, "Feed state changed");
        }
    }
}

struct Inner {
    engine: Arc<Engine>,
    config: SupervisorConfig,
    shutdown: watch::Sender<bool>,
    feeds: RwLock<BTreeMap<String, Arc<Feed>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Owns every websocket dispatch and reconnect task.
pub struct WebsocketSupervisor {
    inner: Arc<Inner>,
}

impl WebsocketSupervisor {
    pub fn new(engine: Arc<Engine>, config: SupervisorConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                engine,
                config,
                shutdown,
                feeds: RwLock::new(BTreeMap::new()),
                handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Start a feed for every enabled exchange with streaming turned on.
    ///
    /// Returns the number of feeds started.
    pub fn start(&self) -> usize {
        let mut started = 0;
        for entry in self.inner.engine.registry().snapshot() {
            if !entry.is_enabled() || !entry.supports_websocket() {
                continue;
            }
            let Some(connection) = entry.exchange().websocket() else {
                continue;
            };
            if !connection.is_enabled() {
                info!(exchange = %entry.name(), "Websocket not enabled, skipping");
                continue;
            }
            self.supervise(connection);
            started += 1;
        }
        info!(feeds = started, "Websocket routine started");
        started
    }

    /// Connect `connection` and spawn its dispatch task.
    pub fn supervise(&self, connection: Arc<dyn WebsocketConnection>) {
        let (tx, rx) = mpsc::channel(self.inner.config.channel_capacity.max(1));
        let feed = Arc::new(Feed {
            name: connection.exchange_name().to_string(),
            connection,
            state: RwLock::new(FeedState::Disconnected),
            reconnecting: AtomicBool::new(false),
            events: tx,
        });
        self.inner
            .feeds
            .write()
            .insert(feed.name.to_ascii_lowercase(), Arc::clone(&feed));

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.run_feed(feed, rx).await });
        self.inner.track(handle);
    }

    /// Current state of a feed, by exchange name.
    #[must_use]
    pub fn state(&self, exchange: &str) -> Option<FeedState> {
        self.inner
            .feeds
            .read()
            .get(&exchange.to_ascii_lowercase())
            .map(|feed| feed.state())
    }

    /// Whether a reconnect task is running for the exchange.
    #[must_use]
    pub fn is_reconnecting(&self, exchange: &str) -> bool {
        self.inner
            .feeds
            .read()
            .get(&exchange.to_ascii_lowercase())
            .is_some_and(|feed| feed.reconnecting.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn feed_count(&self) -> usize {
        self.inner.feeds.read().len()
    }

    /// Close every connection, signal shutdown and wait for all tasks.
    ///
    /// The whole sequence is bounded by the configured timeout. Tasks still
    /// running at the deadline are aborted and reported.
    pub async fn shutdown(&self) -> Result<()> {
        let timeout = self.inner.config.shutdown_timeout;
        let timeout_ms = saturating_millis(timeout);
        let deadline = Instant::now() + timeout;
        info!(timeout_ms, "Shutting down websocket routines");

        let feeds: Vec<Arc<Feed>> = self.inner.feeds.read().values().cloned().collect();
        let closing = join_all(feeds.iter().map(|feed| feed.connection.shutdown()));
        match timeout_at(deadline, closing).await {
            Ok(results) => {
                for (feed, result) in feeds.iter().zip(results) {
                    if let Err(e) = result {
                        warn!(exchange = %feed.name, error = %e, "Websocket shutdown failed");
                    }
                }
            }
            Err(_) => warn!("Timed out closing websocket connections"),
        }

        self.inner.shutdown.send_replace(true);

        let mut handles = std::mem::take(&mut *self.inner.handles.lock());
        let joined = timeout_at(deadline, join_all(handles.iter_mut())).await;
        match joined {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!(error = %e, "Websocket task failed");
                    }
                }
                info!("Websocket routines stopped");
                Ok(())
            }
            Err(_) => {
                let pending = handles.iter().filter(|h| !h.is_finished()).count();
                for handle in &handles {
                    handle.abort();
                }
                error!(pending, "Websocket routines did not stop in time");
                Err(Error::ShutdownTimeout { timeout_ms, pending })
            }
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Inner {
    fn track(&self, handle: JoinHandle<()>) {
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    async fn run_feed(self: Arc<Self>, feed: Arc<Feed>, events: mpsc::Receiver<StreamEvent>) {
        feed.set_state(FeedState::Connecting);
        match feed.connection.connect(feed.events.clone()).await {
            Ok(()) => {
                feed.set_state(FeedState::Connected);
                info!(exchange = %feed.name, "Websocket connected");
            }
            Err(e) => {
                feed.set_state(FeedState::Disconnected);
                error!(exchange = %feed.name, error = %e, "Websocket connect failed");
            }
        }
        self.dispatch(&feed, events).await;
    }

    async fn dispatch(self: &Arc<Self>, feed: &Arc<Feed>, mut events: mpsc::Receiver<StreamEvent>) {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return;
        }

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!(exchange = %feed.name, "Dispatch loop received shutdown");
                        break;
                    }
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!(exchange = %feed.name, "Event channel closed");
                        break;
                    };
                    self.handle_event(feed, event);
                }
            }
        }

        if feed.state() != FeedState::Failed {
            feed.set_state(FeedState::Disconnected);
        }
    }

    fn handle_event(self: &Arc<Self>, feed: &Arc<Feed>, event: StreamEvent) {
        let exchange = feed.name.as_str();
        match event {
            StreamEvent::Info(message) => info!(exchange, message = %message, "Websocket info"),
            StreamEvent::NotEnabled => warn!(exchange, "Websocket reports streaming not enabled"),
            StreamEvent::Error(err) => {
                error!(exchange, error = %err.message, close_code = ?err.close_code, "Websocket error");
                if err.is_abnormal_closure() {
                    self.spawn_reconnect(feed);
                }
            }
            StreamEvent::Trade(trade) => {
                debug!(exchange, pair = %trade.pair, price = %trade.price, amount = %trade.amount, "Trade");
            }
            StreamEvent::Ticker(ticker) => {
                let engine = &self.engine;
                debug!(exchange, pair = %engine.format_currency(&ticker.pair), last = %ticker.last, "Streamed ticker");
                engine.store_ticker(exchange, ticker.clone());
                if self.config.relay {
                    engine.relay(RelayEvent::ticker(exchange, ticker));
                }
            }
            StreamEvent::Kline(kline) => {
                debug!(exchange, pair = %kline.pair, interval = %kline.interval, close = %kline.close, "Kline");
            }
            StreamEvent::OrderbookDelta(delta) => {
                let engine = &self.engine;
                if !engine.orderbooks().apply_delta(exchange, &delta) {
                    debug!(exchange, pair = %delta.pair, "No snapshot for orderbook delta, dropped");
                    return;
                }
                if self.config.relay {
                    if let Some(book) = engine.orderbooks().get(exchange, &delta.pair, delta.asset) {
                        engine.relay(RelayEvent::orderbook(exchange, book));
                    }
                }
            }
            StreamEvent::Connected => {
                feed.set_state(FeedState::Connected);
                info!(exchange, "Websocket connected");
            }
            StreamEvent::Disconnected { reason } => {
                feed.set_state(FeedState::Disconnected);
                warn!(exchange, reason = %reason, "Websocket disconnected");
            }
        }
    }

    /// Spawn a reconnect task unless one is already running for `feed`.
    fn spawn_reconnect(self: &Arc<Self>, feed: &Arc<Feed>) {
        if feed.reconnecting.swap(true, Ordering::SeqCst) {
            debug!(exchange = %feed.name, "Reconnect already in flight");
            return;
        }
        feed.set_state(FeedState::Reconnecting);
        let inner = Arc::clone(self);
        let feed = Arc::clone(feed);
        let handle = tokio::spawn(async move {
            inner.reconnect(&feed).await;
            feed.reconnecting.store(false, Ordering::SeqCst);
        });
        self.track(handle);
    }

    async fn reconnect(&self, feed: &Feed) {
        warn!(exchange = %feed.name, "Abnormal closure, reconnecting websocket");

        if let Err(e) = feed.connection.shutdown().await {
            warn!(exchange = %feed.name, error = %e, "Websocket shutdown before reconnect failed");
        }

        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            feed.set_state(FeedState::Disconnected);
            return;
        }

        let period = self.config.reconnect_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        let mut attempts: u32 = 0;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(exchange = %feed.name, attempts, "Reconnect cancelled by shutdown");
                        feed.set_state(FeedState::Disconnected);
                        return;
                    }
                }
                _ = ticker.tick() => {
                    attempts += 1;
                    match feed.connection.connect(feed.events.clone()).await {
                        Ok(()) => {
                            feed.set_state(FeedState::Connected);
                            info!(exchange = %feed.name, attempts, "Websocket reconnected");
                            return;
                        }
                        Err(e) => {
                            warn!(exchange = %feed.name, attempt = attempts, error = %e, "Reconnect attempt failed");
                            if self.config.max_reconnect_attempts.is_some_and(|max| attempts >= max) {
                                feed.set_state(FeedState::Failed);
                                error!(exchange = %feed.name, attempts, "Giving up on websocket reconnect");
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}
