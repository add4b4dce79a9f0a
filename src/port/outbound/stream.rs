//! Streaming feed port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::asset::AssetType;
use crate::domain::book::BookDelta;
use crate::domain::order::OrderSide;
use crate::domain::pair::CurrencyPair;
use crate::domain::ticker::Ticker;
use crate::error::Result;

/// Websocket close code for an abnormal closure.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// A websocket connection owned by one exchange integration.
///
/// `connect` hands the connection a sender; every inbound message is pushed
/// onto it as a [`StreamEvent`] until the connection drops or is shut down.
#[async_trait]
pub trait WebsocketConnection: Send + Sync {
    fn exchange_name(&self) -> &str;

    /// Whether streaming is turned on for this exchange.
    fn is_enabled(&self) -> bool;

    async fn connect(&self, events: mpsc::Sender<StreamEvent>) -> Result<()>;

    async fn shutdown(&self) -> Result<()>;
}

/// Error reported by a streaming feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    pub message: String,
    pub close_code: Option<u16>,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            close_code: None,
        }
    }

    #[must_use]
    pub fn with_close_code(mut self, code: u16) -> Self {
        self.close_code = Some(code);
        self
    }

    /// An abnormal closure (1006) means the socket died and should be
    /// re-established.
    #[must_use]
    pub fn is_abnormal_closure(&self) -> bool {
        self.close_code == Some(ABNORMAL_CLOSURE) || self.message.contains("close 1006")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeData {
    pub pair: CurrencyPair,
    pub asset: AssetType,
    pub price: Decimal,
    pub amount: Decimal,
    pub side: OrderSide,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KlineData {
    pub pair: CurrencyPair,
    pub asset: AssetType,
    pub interval: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub start: DateTime<Utc>,
}

/// One inbound message from a streaming feed.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Free-form informational text.
    Info(String),
    /// The feed reports streaming is disabled.
    NotEnabled,
    Error(StreamError),
    Trade(TradeData),
    Ticker(Ticker),
    Kline(KlineData),
    OrderbookDelta(BookDelta),
    Connected,
    Disconnected { reason: String },
}

impl StreamEvent {
    /// Short label for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Info(_) => "info",
            Self::NotEnabled => "not_enabled",
            Self::Error(_) => "error",
            Self::Trade(_) => "trade",
            Self::Ticker(_) => "ticker",
            Self::Kline(_) => "kline",
            Self::OrderbookDelta(_) => "orderbook_delta",
            Self::Connected => "connected",
            Self::Disconnected { .. } => "disconnected",
        }
    }
}
