//! Mock [`Exchange`] implementation for testing.
//!
//! [`ScriptedExchange`] answers every market data call from fixed settings
//! and counts calls through shared counters, so tests can assert on how
//! often the network would have been hit.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::stream::ScriptedWebsocket;
use crate::domain::account::AccountInfo;
use crate::domain::asset::AssetType;
use crate::domain::book::{OrderBook, PriceLevel};
use crate::domain::pair::CurrencyPair;
use crate::domain::ticker::Ticker;
use crate::error::{Error, Result};
use crate::port::outbound::exchange::Exchange;
use crate::port::outbound::stream::WebsocketConnection;

// ---------------------------------------------------------------------------
// ScriptedExchange
// ---------------------------------------------------------------------------

/// A mock exchange with configurable prices, failures and capabilities.
///
/// Defaults: spot only, REST on, no batching, every ticker priced at 100 and
/// every order book one level deep on each side.
pub struct ScriptedExchange {
    name: String,
    assets: Vec<AssetType>,
    rest: bool,
    batch: Option<Vec<CurrencyPair>>,
    price: Decimal,
    tradable: Vec<String>,
    fail_tickers: bool,
    fail_orderbooks: bool,
    panic_on_ticker: bool,
    ticker_delay: Option<Duration>,
    account: Option<AccountInfo>,
    websocket: Option<Arc<ScriptedWebsocket>>,
    ticker_calls: Arc<AtomicU32>,
    orderbook_calls: Arc<AtomicU32>,
    requested: Arc<Mutex<Vec<CurrencyPair>>>,
}

impl ScriptedExchange {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            assets: vec![AssetType::Spot],
            rest: true,
            batch: None,
            price: dec!(100),
            tradable: Vec::new(),
            fail_tickers: false,
            fail_orderbooks: false,
            panic_on_ticker: false,
            ticker_delay: None,
            account: None,
            websocket: None,
            ticker_calls: Arc::new(AtomicU32::new(0)),
            orderbook_calls: Arc::new(AtomicU32::new(0)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_assets(mut self, assets: Vec<AssetType>) -> Self {
        self.assets = assets;
        self
    }

    /// Report no REST support; pollers must skip this exchange.
    pub fn without_rest(mut self) -> Self {
        self.rest = false;
        self
    }

    /// Batch tickers: every update returns a ticker for each of `pairs`.
    pub fn with_batching(mut self, pairs: Vec<&str>) -> Self {
        self.batch = Some(pairs.into_iter().map(parse).collect());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// Symbols returned by `fetch_tradable_pairs`.
    pub fn with_tradable_pairs(mut self, symbols: Vec<&str>) -> Self {
        self.tradable = symbols.into_iter().map(str::to_string).collect();
        self
    }

    pub fn failing_tickers(mut self) -> Self {
        self.fail_tickers = true;
        self
    }

    pub fn failing_orderbooks(mut self) -> Self {
        self.fail_orderbooks = true;
        self
    }

    pub fn panicking_tickers(mut self) -> Self {
        self.panic_on_ticker = true;
        self
    }

    /// Sleep before answering each ticker call.
    pub fn with_ticker_delay(mut self, delay: Duration) -> Self {
        self.ticker_delay = Some(delay);
        self
    }

    pub fn with_account_info(mut self, info: AccountInfo) -> Self {
        self.account = Some(info);
        self
    }

    pub fn with_websocket(mut self, websocket: Arc<ScriptedWebsocket>) -> Self {
        self.websocket = Some(websocket);
        self
    }

    /// Shared counter of `update_ticker` calls.
    pub fn ticker_calls(&self) -> Arc<AtomicU32> {
        self.ticker_calls.clone()
    }

    pub fn orderbook_calls(&self) -> Arc<AtomicU32> {
        self.orderbook_calls.clone()
    }

    /// Pairs passed to `update_ticker`, in call order.
    pub fn requested_pairs(&self) -> Arc<Mutex<Vec<CurrencyPair>>> {
        self.requested.clone()
    }

    fn ticker(&self, pair: &CurrencyPair, asset: AssetType) -> Ticker {
        Ticker::new(pair.clone(), asset, self.price).with_volume(dec!(1))
    }
}

fn parse(pair: &str) -> CurrencyPair {
    pair.parse().unwrap_or_else(|e| panic!("invalid test pair {pair}: {e}"))
}

#[async_trait]
impl Exchange for ScriptedExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn asset_types(&self) -> Vec<AssetType> {
        self.assets.clone()
    }

    fn supports_rest(&self) -> bool {
        self.rest
    }

    fn supports_ticker_batching(&self) -> bool {
        self.batch.is_some()
    }

    fn websocket(&self) -> Option<Arc<dyn WebsocketConnection>> {
        self.websocket
            .as_ref()
            .map(|ws| Arc::clone(ws) as Arc<dyn WebsocketConnection>)
    }

    async fn update_ticker(&self, pair: &CurrencyPair, asset: AssetType) -> Result<Vec<Ticker>> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(pair.clone());
        if let Some(delay) = self.ticker_delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_on_ticker {
            panic!("scripted ticker panic for {}", self.name);
        }
        if self.fail_tickers {
            return Err(Error::exchange(&self.name, "scripted ticker failure"));
        }

        let mut tickers = vec![self.ticker(pair, asset)];
        if let Some(batch) = &self.batch {
            tickers.extend(
                batch
                    .iter()
                    .filter(|p| !p.matches_exact(pair))
                    .map(|p| self.ticker(p, asset)),
            );
        }
        Ok(tickers)
    }

    async fn update_orderbook(&self, pair: &CurrencyPair, asset: AssetType) -> Result<OrderBook> {
        self.orderbook_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_orderbooks {
            return Err(Error::exchange(&self.name, "scripted orderbook failure"));
        }
        Ok(OrderBook::with_levels(
            pair.clone(),
            asset,
            vec![PriceLevel::new(self.price - dec!(1), dec!(1))],
            vec![PriceLevel::new(self.price + dec!(1), dec!(1))],
        ))
    }

    async fn fetch_tradable_pairs(&self, _asset: AssetType) -> Result<Vec<String>> {
        Ok(self.tradable.clone())
    }

    async fn account_info(&self) -> Result<AccountInfo> {
        self.account
            .clone()
            .ok_or_else(|| Error::exchange(&self.name, "no scripted account info"))
    }
}
