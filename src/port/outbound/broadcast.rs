//! Relay port for pushing fresh market data downstream.

use serde::Serialize;

use crate::domain::asset::AssetType;
use crate::domain::book::OrderBook;
use crate::domain::ticker::Ticker;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayKind {
    TickerUpdate,
    OrderbookUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelayPayload {
    Ticker(Ticker),
    Orderbook(OrderBook),
}

/// Tagged event handed to downstream subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayEvent {
    pub event: RelayKind,
    pub exchange: String,
    pub asset: AssetType,
    pub data: RelayPayload,
}

impl RelayEvent {
    pub fn ticker(exchange: impl Into<String>, ticker: Ticker) -> Self {
        Self {
            event: RelayKind::TickerUpdate,
            exchange: exchange.into(),
            asset: ticker.asset,
            data: RelayPayload::Ticker(ticker),
        }
    }

    pub fn orderbook(exchange: impl Into<String>, book: OrderBook) -> Self {
        Self {
            event: RelayKind::OrderbookUpdate,
            exchange: exchange.into(),
            asset: book.asset,
            data: RelayPayload::Orderbook(book),
        }
    }
}

/// Downstream fan-out (web socket server, RPC stream).
///
/// Errors are logged by the caller and never abort a polling pass.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, event: RelayEvent) -> Result<()>;
}
