//! Exchange capability port.
//!
//! Every exchange integration implements [`Exchange`]. The core never looks
//! past this trait, so HTTP plumbing and authentication stay inside the
//! adapter.

use std::sync::Arc;

use async_trait::async_trait;

use super::stream::WebsocketConnection;
use crate::domain::account::AccountInfo;
use crate::domain::asset::AssetType;
use crate::domain::book::OrderBook;
use crate::domain::order::{
    CancelAllOrdersResponse, OrderCancellation, OrderDetail, OrderRequest, SubmitOrderResponse,
};
use crate::domain::pair::CurrencyPair;
use crate::domain::ticker::Ticker;
use crate::error::{Error, Result};

/// Capability contract for one exchange integration.
///
/// Enabled/available pair lists and the enabled flag are tracked by the
/// registry, not by the implementation.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Unique exchange name used in logs, cache keys and lookups.
    fn name(&self) -> &str;

    /// Asset types this integration can serve.
    fn asset_types(&self) -> Vec<AssetType>;

    /// Whether the integration can be polled over REST.
    fn supports_rest(&self) -> bool {
        true
    }

    /// Whether one ticker call returns every pair of the asset type.
    fn supports_ticker_batching(&self) -> bool {
        false
    }

    /// Streaming feed, if the exchange has one.
    fn websocket(&self) -> Option<Arc<dyn WebsocketConnection>> {
        None
    }

    /// Fetch fresh tickers from the network.
    ///
    /// A batching exchange returns every ticker of `asset`, otherwise the
    /// result holds the single ticker for `pair`.
    async fn update_ticker(&self, pair: &CurrencyPair, asset: AssetType) -> Result<Vec<Ticker>>;

    /// Fetch a fresh order book from the network.
    async fn update_orderbook(&self, pair: &CurrencyPair, asset: AssetType) -> Result<OrderBook>;

    /// Exchange-native symbols currently tradable for `asset`.
    async fn fetch_tradable_pairs(&self, asset: AssetType) -> Result<Vec<String>>;

    async fn account_info(&self) -> Result<AccountInfo> {
        Err(not_supported(self.name(), "account info"))
    }

    async fn submit_order(&self, _order: &OrderRequest) -> Result<SubmitOrderResponse> {
        Err(not_supported(self.name(), "order submission"))
    }

    async fn cancel_order(&self, _cancel: &OrderCancellation) -> Result<()> {
        Err(not_supported(self.name(), "order cancellation"))
    }

    async fn cancel_all_orders(&self, _pair: &CurrencyPair) -> Result<CancelAllOrdersResponse> {
        Err(not_supported(self.name(), "bulk order cancellation"))
    }

    async fn order_info(&self, _order_id: &str) -> Result<OrderDetail> {
        Err(not_supported(self.name(), "order lookup"))
    }
}

fn not_supported(exchange: &str, operation: &'static str) -> Error {
    Error::NotSupported {
        exchange: exchange.to_string(),
        operation,
    }
}
