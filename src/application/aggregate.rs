//! Cross-exchange aggregation root.
//!
//! [`Engine`] owns the registry handle, the market data caches, price stats
//! and the portfolio ledger. Pollers and the websocket supervisor write
//! through it; query-style callers (REST/RPC handlers) read through it.
//!
//! Functions that walk many exchanges never fail fast: a broken exchange is
//! logged and contributes nothing. Functions that target one exchange by
//! name fail with [`Error::ExchangeNotFound`].

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::account::{collate_account_info_by_coin, reconcile_portfolio, ReconcileSummary};
use super::cache::{OrderbookCache, TickerCache};
use super::portfolio::Portfolio;
use super::registry::{ExchangeEntry, ExchangeRegistry, PairConsistency};
use super::relation::PairRelations;
use super::stats::PriceStats;
use crate::domain::account::{AccountCurrencyInfo, AccountInfo};
use crate::domain::asset::AssetType;
use crate::domain::book::OrderBook;
use crate::domain::currency::{CurrencyClasses, CurrencyCode};
use crate::domain::order::{
    CancelAllOrdersResponse, OrderCancellation, OrderDetail, OrderRequest, SubmitOrderResponse,
};
use crate::domain::pair::{CurrencyPair, DisplayFormat, PairSet};
use crate::domain::ticker::Ticker;
use crate::error::{Error, Result};
use crate::port::outbound::broadcast::{Broadcaster, RelayEvent};
use crate::port::outbound::portfolio::PortfolioLedger;

/// Cached tickers of one enabled exchange.
#[derive(Debug, Clone)]
pub struct ExchangeTickers {
    pub exchange: String,
    pub tickers: Vec<Ticker>,
}

/// Cached order books of one enabled exchange.
#[derive(Debug, Clone)]
pub struct ExchangeOrderbooks {
    pub exchange: String,
    pub orderbooks: Vec<OrderBook>,
}

/// Aggregation root shared by every runtime task.
pub struct Engine {
    registry: Arc<ExchangeRegistry>,
    relations: PairRelations,
    tickers: TickerCache,
    orderbooks: OrderbookCache,
    stats: PriceStats,
    portfolio: Arc<dyn PortfolioLedger>,
    broadcaster: Option<Arc<dyn Broadcaster>>,
    display: DisplayFormat,
}

impl Engine {
    /// Create an engine with empty caches and an in-memory portfolio.
    pub fn new(registry: Arc<ExchangeRegistry>, classes: CurrencyClasses) -> Self {
        Self {
            registry,
            relations: PairRelations::new(classes),
            tickers: TickerCache::new(),
            orderbooks: OrderbookCache::new(),
            stats: PriceStats::new(),
            portfolio: Arc::new(Portfolio::new()),
            broadcaster: None,
            display: DisplayFormat::default(),
        }
    }

    /// Relay fresh tickers and books to `broadcaster`.
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    #[must_use]
    pub fn with_portfolio(mut self, portfolio: Arc<dyn PortfolioLedger>) -> Self {
        self.portfolio = portfolio;
        self
    }

    #[must_use]
    pub fn with_display(mut self, display: DisplayFormat) -> Self {
        self.display = display;
        self
    }

    #[must_use]
    pub fn with_orderbook_cache(mut self, cache: OrderbookCache) -> Self {
        self.orderbooks = cache;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ExchangeRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn relations(&self) -> &PairRelations {
        &self.relations
    }

    #[must_use]
    pub fn tickers(&self) -> &TickerCache {
        &self.tickers
    }

    #[must_use]
    pub fn orderbooks(&self) -> &OrderbookCache {
        &self.orderbooks
    }

    #[must_use]
    pub fn stats(&self) -> &PriceStats {
        &self.stats
    }

    #[must_use]
    pub fn portfolio(&self) -> &Arc<dyn PortfolioLedger> {
        &self.portfolio
    }

    // -----------------------------------------------------------------------
    // Cache write path
    // -----------------------------------------------------------------------

    /// Fetch tickers from the network and store every one returned.
    ///
    /// Returns the ticker for `pair`. A batching exchange refreshes the
    /// whole asset type in this call.
    pub async fn update_ticker(
        &self,
        entry: &ExchangeEntry,
        pair: &CurrencyPair,
        asset: AssetType,
    ) -> Result<Ticker> {
        let tickers = entry.exchange().update_ticker(pair, asset).await?;
        let mut requested = None;
        for ticker in tickers {
            if ticker.asset == asset && ticker.pair.matches_exact(pair) {
                requested = Some(ticker.clone());
            }
            self.store_ticker(entry.name(), ticker);
        }
        requested.ok_or_else(|| {
            Error::exchange(entry.name(), format!("no ticker returned for {pair} {asset}"))
        })
    }

    /// Serve the cached ticker, or force a live update when absent.
    pub async fn fetch_ticker(
        &self,
        entry: &ExchangeEntry,
        pair: &CurrencyPair,
        asset: AssetType,
    ) -> Result<Ticker> {
        match self.tickers.get(entry.name(), pair, asset) {
            Some(ticker) => Ok(ticker),
            None => self.update_ticker(entry, pair, asset).await,
        }
    }

    /// Write a ticker into the cache and the price stats.
    pub fn store_ticker(&self, exchange: &str, ticker: Ticker) {
        self.stats
            .add(exchange, &ticker.pair, ticker.asset, ticker.last, ticker.volume);
        self.tickers.put(exchange, ticker);
    }

    pub async fn update_orderbook(
        &self,
        entry: &ExchangeEntry,
        pair: &CurrencyPair,
        asset: AssetType,
    ) -> Result<OrderBook> {
        let book = entry.exchange().update_orderbook(pair, asset).await?;
        self.orderbooks.put(entry.name(), book.clone());
        Ok(book)
    }

    /// Serve the cached book, or force a live update when absent.
    pub async fn fetch_orderbook(
        &self,
        entry: &ExchangeEntry,
        pair: &CurrencyPair,
        asset: AssetType,
    ) -> Result<OrderBook> {
        match self.orderbooks.get(entry.name(), pair, asset) {
            Some(book) => Ok(book),
            None => self.update_orderbook(entry, pair, asset).await,
        }
    }

    /// Push an event to the downstream relay, if one is attached.
    ///
    /// Relay failures are logged and swallowed.
    pub fn relay(&self, event: RelayEvent) {
        let Some(broadcaster) = &self.broadcaster else {
            return;
        };
        let exchange = event.exchange.clone();
        if let Err(e) = broadcaster.broadcast(event) {
            warn!(exchange = %exchange, error = %e, "Failed to relay update");
        }
    }

    #[must_use]
    pub fn has_relay(&self) -> bool {
        self.broadcaster.is_some()
    }

    // -----------------------------------------------------------------------
    // Pair queries
    // -----------------------------------------------------------------------

    /// Union of every exchange's available pairs, deduplicated in either
    /// order.
    #[must_use]
    pub fn all_available_pairs(&self, enabled_only: bool, asset: AssetType) -> PairSet {
        let mut pairs = PairSet::either_order();
        for entry in self.registry.snapshot() {
            if enabled_only && !entry.is_enabled() {
                continue;
            }
            match entry.available_pairs(asset) {
                Ok(available) => pairs.extend(available),
                Err(e) => debug!(exchange = %entry.name(), error = %e, "Skipping exchange"),
            }
        }
        pairs
    }

    /// Available pairs filtered to crypto/fiat and/or crypto/crypto pairs.
    ///
    /// With `fiat`, crypto/fiat pairs are kept, plus crypto pairs quoted in
    /// the stablecoin when `include_stablecoin` is set. With `crypto`, every
    /// crypto/crypto pair is kept.
    #[must_use]
    pub fn specific_available_pairs(
        &self,
        enabled_only: bool,
        fiat: bool,
        include_stablecoin: bool,
        crypto: bool,
        asset: AssetType,
    ) -> PairSet {
        let classes = self.relations.classes();
        let stablecoin = classes.stablecoin();
        let mut selected = PairSet::either_order();

        for pair in self.all_available_pairs(enabled_only, asset) {
            let has_stablecoin = pair.contains_currency(stablecoin);
            let fiat_match = (classes.is_crypto_fiat_pair(&pair) && !has_stablecoin)
                || (include_stablecoin && has_stablecoin && classes.is_crypto_pair(&pair));
            let crypto_match = classes.is_crypto_pair(&pair);

            if (fiat && fiat_match) || (crypto && crypto_match) {
                selected.insert(pair);
            }
        }
        selected
    }

    /// Inverse index: exchange name to the subset of `pairs` it supports.
    ///
    /// Support is either-order membership in the exchange's available pairs.
    #[must_use]
    pub fn map_currencies_by_exchange(
        &self,
        pairs: &[CurrencyPair],
        enabled_only: bool,
        asset: AssetType,
    ) -> BTreeMap<String, PairSet> {
        let exchanges = self.registry.snapshot();
        let mut mapped: BTreeMap<String, PairSet> = BTreeMap::new();
        for pair in pairs {
            for entry in &exchanges {
                if enabled_only && !entry.is_enabled() {
                    continue;
                }
                if !entry.supports_pair(pair, asset) {
                    continue;
                }
                mapped
                    .entry(entry.name().to_string())
                    .or_insert_with(PairSet::either_order)
                    .insert(pair.clone());
            }
        }
        mapped
    }

    /// Names of exchanges listing `pair` in either order whose enabled flag
    /// equals `enabled`. Passing `false` lists only disabled exchanges.
    #[must_use]
    pub fn exchange_names_by_currency(
        &self,
        pair: &CurrencyPair,
        enabled: bool,
        asset: AssetType,
    ) -> Vec<String> {
        self.registry
            .snapshot()
            .into_iter()
            .filter(|entry| entry.is_enabled() == enabled)
            .filter(|entry| entry.supports_pair(pair, asset))
            .map(|entry| entry.name().to_string())
            .collect()
    }

    /// Distinct cryptocurrencies appearing on either side of an exchange's
    /// enabled (or available) pairs.
    pub fn cryptocurrencies_by_exchange(
        &self,
        name: &str,
        enabled_only: bool,
        enabled_pairs: bool,
        asset: AssetType,
    ) -> Result<Vec<CurrencyCode>> {
        let entry = self.registry.get(name)?;
        if enabled_only && !entry.is_enabled() {
            return Ok(Vec::new());
        }
        let pairs = if enabled_pairs {
            entry.enabled_pairs(asset)
        } else {
            entry.available_pairs(asset)?
        };

        let classes = self.relations.classes();
        let mut found: Vec<CurrencyCode> = Vec::new();
        for code in pairs.iter().flat_map(|p| [p.first(), p.second()]) {
            if classes.is_crypto(code) && !found.contains(code) {
                found.push(code.clone());
            }
        }
        Ok(found)
    }

    /// Refresh an exchange's available pairs from the network.
    ///
    /// Unparseable symbols are skipped. Enabled pairs are then reconciled
    /// against the new list.
    pub async fn update_exchange_pairs(
        &self,
        name: &str,
        asset: AssetType,
    ) -> Result<PairConsistency> {
        let entry = self.registry.get(name)?;
        let symbols = entry.exchange().fetch_tradable_pairs(asset).await?;
        let format = entry.pair_format(asset);

        let mut available = PairSet::exact();
        for symbol in &symbols {
            match format.parse(symbol) {
                Ok(pair) => {
                    available.insert(pair);
                }
                Err(e) => warn!(exchange = %entry.name(), symbol = %symbol, error = %e, "Skipping tradable pair"),
            }
        }

        debug!(exchange = %entry.name(), asset = %asset, count = available.len(), "Updated available pairs");
        entry.set_available_pairs(asset, available.into_vec());
        Ok(entry.check_pair_consistency(asset))
    }

    /// Render a pair with the configured display delimiter and case.
    #[must_use]
    pub fn format_currency(&self, pair: &CurrencyPair) -> String {
        pair.format(&self.display)
    }

    // -----------------------------------------------------------------------
    // Accounts and prices
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn collate_account_info_by_coin(
        &self,
        accounts: &[AccountInfo],
    ) -> BTreeMap<CurrencyCode, AccountCurrencyInfo> {
        collate_account_info_by_coin(accounts)
    }

    /// Reconcile fetched balances into the portfolio ledger.
    pub fn seed_exchange_account_info(&self, data: &[AccountInfo]) -> ReconcileSummary {
        reconcile_portfolio(self.portfolio.as_ref(), data)
    }

    pub async fn account_info_by_exchange_name(&self, name: &str) -> Result<AccountInfo> {
        let entry = self.registry.get(name)?;
        entry.exchange().account_info().await
    }

    /// Account info from every enabled exchange, fetched concurrently.
    ///
    /// Exchanges that fail are logged and left out.
    pub async fn all_enabled_account_info(&self) -> Vec<AccountInfo> {
        let enabled: Vec<_> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|e| e.is_enabled())
            .collect();
        let fetches = enabled.iter().map(|entry| async move {
            (entry.name(), entry.exchange().account_info().await)
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(name, result)| match result {
                Ok(info) => Some(info),
                Err(e) => {
                    warn!(exchange = %name, error = %e, "Failed to fetch account info");
                    None
                }
            })
            .collect()
    }

    /// Cache-first ticker lookup for one exchange.
    pub async fn specific_ticker(
        &self,
        pair: &str,
        exchange: &str,
        asset: AssetType,
    ) -> Result<Ticker> {
        let entry = self.registry.get(exchange)?;
        let pair: CurrencyPair = pair.parse()?;
        self.fetch_ticker(&entry, &pair, asset).await
    }

    /// Cache-first order book lookup for one exchange.
    pub async fn specific_orderbook(
        &self,
        pair: &str,
        exchange: &str,
        asset: AssetType,
    ) -> Result<OrderBook> {
        let entry = self.registry.get(exchange)?;
        let pair: CurrencyPair = pair.parse()?;
        self.fetch_orderbook(&entry, &pair, asset).await
    }

    pub fn exchange_with_highest_price(&self, pair: &CurrencyPair, asset: AssetType) -> Result<String> {
        self.stats.exchange_with_highest_price(pair, asset)
    }

    pub fn exchange_with_lowest_price(&self, pair: &CurrencyPair, asset: AssetType) -> Result<String> {
        self.stats.exchange_with_lowest_price(pair, asset)
    }

    /// Cached tickers of every enabled exchange, fetching any missing ones.
    pub async fn active_tickers(&self) -> Vec<ExchangeTickers> {
        let mut result = Vec::new();
        for entry in self.registry.snapshot().into_iter().filter(|e| e.is_enabled()) {
            let mut tickers = Vec::new();
            for asset in entry.asset_types() {
                for pair in entry.enabled_pairs(asset) {
                    match self.fetch_ticker(&entry, &pair, asset).await {
                        Ok(ticker) => tickers.push(ticker),
                        Err(e) => warn!(exchange = %entry.name(), pair = %pair, error = %e, "Failed to get ticker"),
                    }
                }
            }
            result.push(ExchangeTickers {
                exchange: entry.name().to_string(),
                tickers,
            });
        }
        result
    }

    /// Cached order books of every enabled exchange, fetching missing ones.
    pub async fn active_orderbooks(&self) -> Vec<ExchangeOrderbooks> {
        let mut result = Vec::new();
        for entry in self.registry.snapshot().into_iter().filter(|e| e.is_enabled()) {
            let mut orderbooks = Vec::new();
            for asset in entry.asset_types() {
                for pair in entry.enabled_pairs(asset) {
                    match self.fetch_orderbook(&entry, &pair, asset).await {
                        Ok(book) => orderbooks.push(book),
                        Err(e) => warn!(exchange = %entry.name(), pair = %pair, error = %e, "Failed to get orderbook"),
                    }
                }
            }
            result.push(ExchangeOrderbooks {
                exchange: entry.name().to_string(),
                orderbooks,
            });
        }
        result
    }

    // -----------------------------------------------------------------------
    // Registry and order pass-throughs
    // -----------------------------------------------------------------------

    pub fn enable_exchange(&self, name: &str) -> Result<()> {
        self.registry.enable(name)
    }

    pub fn disable_exchange(&self, name: &str) -> Result<()> {
        self.registry.disable(name)
    }

    #[must_use]
    pub fn enabled_exchanges(&self) -> Vec<String> {
        self.registry.enabled_names()
    }

    #[must_use]
    pub fn disabled_exchanges(&self) -> Vec<String> {
        self.registry.disabled_names()
    }

    #[must_use]
    pub fn count_enabled_exchanges(&self) -> usize {
        self.registry.count_enabled()
    }

    pub async fn submit_order_by_exchange(
        &self,
        name: &str,
        order: &OrderRequest,
    ) -> Result<SubmitOrderResponse> {
        self.registry.get(name)?.exchange().submit_order(order).await
    }

    pub async fn cancel_order_by_exchange(
        &self,
        name: &str,
        cancel: &OrderCancellation,
    ) -> Result<()> {
        self.registry.get(name)?.exchange().cancel_order(cancel).await
    }

    pub async fn cancel_all_orders_by_exchange(
        &self,
        name: &str,
        pair: &CurrencyPair,
    ) -> Result<CancelAllOrdersResponse> {
        self.registry.get(name)?.exchange().cancel_all_orders(pair).await
    }

    pub async fn order_by_exchange(&self, name: &str, order_id: &str) -> Result<OrderDetail> {
        self.registry.get(name)?.exchange().order_info(order_id).await
    }
}
