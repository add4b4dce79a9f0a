//! Mock [`WebsocketConnection`] implementation for testing.
//!
//! [`ScriptedWebsocket`] pops pre-loaded connect results and keeps the last
//! event sender it was handed, so a test can push events into the
//! supervisor's dispatch loop with [`ScriptedWebsocket::emit`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::port::outbound::stream::{StreamError, StreamEvent, WebsocketConnection, ABNORMAL_CLOSURE};

// ---------------------------------------------------------------------------
// ScriptedWebsocket
// ---------------------------------------------------------------------------

/// A mock websocket with scripted connect results.
///
/// Each call to `connect()` pops the next result from the queue (defaults to
/// `Ok(())` when exhausted).
pub struct ScriptedWebsocket {
    name: String,
    enabled: AtomicBool,
    connect_results: Mutex<VecDeque<Result<()>>>,
    hang_on_shutdown: bool,
    sender: Mutex<Option<mpsc::Sender<StreamEvent>>>,
    connect_count: Arc<AtomicU32>,
    shutdown_count: Arc<AtomicU32>,
}

impl ScriptedWebsocket {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: AtomicBool::new(true),
            connect_results: Mutex::new(VecDeque::new()),
            hang_on_shutdown: false,
            sender: Mutex::new(None),
            connect_count: Arc::new(AtomicU32::new(0)),
            shutdown_count: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_connect_results(self, results: Vec<Result<()>>) -> Self {
        *self.connect_results.lock().unwrap() = results.into();
        self
    }

    /// Fail the next `n` connects.
    pub fn failing_connects(self, n: usize) -> Self {
        let results = (0..n)
            .map(|i| Err(Error::Websocket(format!("scripted connect failure {i}"))))
            .collect();
        self.with_connect_results(results)
    }

    /// Report streaming as turned off.
    pub fn disabled(self) -> Self {
        self.enabled.store(false, Ordering::SeqCst);
        self
    }

    /// Never return from `shutdown()`.
    pub fn hanging_shutdown(mut self) -> Self {
        self.hang_on_shutdown = true;
        self
    }

    /// Get shared counters for asserting connect/shutdown call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.shutdown_count.clone())
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn shutdown_count(&self) -> u32 {
        self.shutdown_count.load(Ordering::SeqCst)
    }

    /// Push an event as if it arrived on the socket.
    ///
    /// Returns `false` if no connect has handed over a sender yet, or the
    /// receiving side is gone.
    pub async fn emit(&self, event: StreamEvent) -> bool {
        let sender = self.sender.lock().unwrap().clone();
        match sender {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Push an abnormal closure (1006) error.
    pub async fn emit_abnormal_closure(&self) -> bool {
        self.emit(StreamEvent::Error(
            StreamError::new("websocket: close 1006 (abnormal closure)").with_close_code(ABNORMAL_CLOSURE),
        ))
        .await
    }
}

#[async_trait]
impl WebsocketConnection for ScriptedWebsocket {
    fn exchange_name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn connect(&self, events: mpsc::Sender<StreamEvent>) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        *self.sender.lock().unwrap() = Some(events);
        self.connect_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdown_count.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_shutdown {
            return std::future::pending().await;
        }
        Ok(())
    }
}
