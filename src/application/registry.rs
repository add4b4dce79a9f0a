//! Exchange registry: live per-exchange state shared by pollers and queries.
//!
//! The registry hands out snapshots of `Arc<ExchangeEntry>` handles. Each
//! entry synchronizes its own enabled flag and pair stores, so a disable that
//! lands mid-iteration is observed by the next pass without any caller-side
//! locking.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::domain::asset::AssetType;
use crate::domain::pair::{CurrencyPair, PairFormat};
use crate::error::{Error, Result};
use crate::port::outbound::exchange::Exchange;

/// Available and enabled pairs of one asset type on one exchange.
#[derive(Debug, Clone, Default)]
pub struct PairStore {
    pub available: Vec<CurrencyPair>,
    pub enabled: Vec<CurrencyPair>,
    pub format: PairFormat,
}

impl PairStore {
    #[must_use]
    pub fn new(available: Vec<CurrencyPair>, enabled: Vec<CurrencyPair>) -> Self {
        Self {
            available,
            enabled,
            format: PairFormat::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: PairFormat) -> Self {
        self.format = format;
        self
    }
}

/// Outcome of reconciling enabled pairs against available pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairConsistency {
    /// Enabled pairs that were no longer available.
    pub removed: Vec<CurrencyPair>,
    /// Pair enabled because nothing else was left.
    pub enabled: Option<CurrencyPair>,
}

impl PairConsistency {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty() && self.enabled.is_none()
    }
}

/// Live state for one configured exchange.
pub struct ExchangeEntry {
    name: String,
    enabled: AtomicBool,
    rest_enabled: bool,
    websocket_enabled: bool,
    pairs: RwLock<BTreeMap<AssetType, PairStore>>,
    exchange: Arc<dyn Exchange>,
}

impl ExchangeEntry {
    /// Wrap an exchange; enabled, REST on, websocket off, no pairs.
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self {
            name: exchange.name().to_string(),
            enabled: AtomicBool::new(true),
            rest_enabled: true,
            websocket_enabled: false,
            pairs: RwLock::new(BTreeMap::new()),
            exchange,
        }
    }

    #[must_use]
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.enabled.store(enabled, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn with_rest(mut self, enabled: bool) -> Self {
        self.rest_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_websocket(mut self, enabled: bool) -> Self {
        self.websocket_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_pairs(self, asset: AssetType, store: PairStore) -> Self {
        self.pairs.write().insert(asset, store);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn exchange(&self) -> &Arc<dyn Exchange> {
        &self.exchange
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// REST polling is configured on and the integration can serve it.
    #[must_use]
    pub fn supports_rest(&self) -> bool {
        self.rest_enabled && self.exchange.supports_rest()
    }

    /// Streaming is configured on and the integration has a feed.
    #[must_use]
    pub fn supports_websocket(&self) -> bool {
        self.websocket_enabled && self.exchange.websocket().is_some()
    }

    #[must_use]
    pub fn supports_ticker_batching(&self) -> bool {
        self.exchange.supports_ticker_batching()
    }

    /// Asset types served by the integration, in a stable order.
    #[must_use]
    pub fn asset_types(&self) -> Vec<AssetType> {
        let mut assets = self.exchange.asset_types();
        assets.sort();
        assets.dedup();
        assets
    }

    #[must_use]
    pub fn supports_asset(&self, asset: AssetType) -> bool {
        self.exchange.asset_types().contains(&asset)
    }

    /// Enabled pairs for `asset`; empty when none are configured.
    #[must_use]
    pub fn enabled_pairs(&self, asset: AssetType) -> Vec<CurrencyPair> {
        self.pairs
            .read()
            .get(&asset)
            .map(|store| store.enabled.clone())
            .unwrap_or_default()
    }

    /// Available pairs for `asset`.
    pub fn available_pairs(&self, asset: AssetType) -> Result<Vec<CurrencyPair>> {
        if !self.supports_asset(asset) {
            return Err(self.asset_not_supported(asset));
        }
        self.pairs
            .read()
            .get(&asset)
            .map(|store| store.available.clone())
            .ok_or_else(|| self.asset_not_supported(asset))
    }

    /// Whether `pair` is available for `asset`, in either order.
    #[must_use]
    pub fn supports_pair(&self, pair: &CurrencyPair, asset: AssetType) -> bool {
        self.available_pairs(asset)
            .is_ok_and(|available| available.iter().any(|p| p.matches_either_order(pair)))
    }

    #[must_use]
    pub fn pair_format(&self, asset: AssetType) -> PairFormat {
        self.pairs
            .read()
            .get(&asset)
            .map(|store| store.format.clone())
            .unwrap_or_default()
    }

    pub fn set_available_pairs(&self, asset: AssetType, pairs: Vec<CurrencyPair>) {
        self.pairs.write().entry(asset).or_default().available = pairs;
    }

    pub fn set_enabled_pairs(&self, asset: AssetType, pairs: Vec<CurrencyPair>) {
        self.pairs.write().entry(asset).or_default().enabled = pairs;
    }

    /// Drop enabled pairs that are no longer available (exact match).
    ///
    /// If that leaves nothing enabled, a random available pair is enabled
    /// so the exchange keeps producing data.
    pub fn check_pair_consistency(&self, asset: AssetType) -> PairConsistency {
        let mut pairs = self.pairs.write();
        let Some(store) = pairs.get_mut(&asset) else {
            return PairConsistency::default();
        };

        let mut report = PairConsistency::default();
        let available = &store.available;
        store.enabled.retain(|pair| {
            let keep = available.iter().any(|p| p.matches_exact(pair));
            if !keep {
                report.removed.push(pair.clone());
            }
            keep
        });

        if !report.removed.is_empty() {
            warn!(
                exchange = %self.name,
                asset = %asset,
                removed = ?report.removed.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "Removed enabled pairs no longer available"
            );
        }

        if store.enabled.is_empty() {
            if let Some(pick) = store.available.choose(&mut rand::thread_rng()).cloned() {
                warn!(
                    exchange = %self.name,
                    asset = %asset,
                    pair = %pick,
                    "No enabled pairs left, enabling a random available pair"
                );
                store.enabled.push(pick.clone());
                report.enabled = Some(pick);
            }
        }

        report
    }

    fn asset_not_supported(&self, asset: AssetType) -> Error {
        Error::AssetNotSupported {
            exchange: self.name.clone(),
            asset,
        }
    }
}

impl std::fmt::Debug for ExchangeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeEntry")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .field("rest_enabled", &self.rest_enabled)
            .field("websocket_enabled", &self.websocket_enabled)
            .finish_non_exhaustive()
    }
}

/// Synchronized list of configured exchanges.
#[derive(Debug, Default)]
pub struct ExchangeRegistry {
    entries: RwLock<Vec<Arc<ExchangeEntry>>>,
}

impl ExchangeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exchange. Names must be unique, ignoring case.
    pub fn register(&self, entry: ExchangeEntry) -> Result<Arc<ExchangeEntry>> {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.name.eq_ignore_ascii_case(&entry.name)) {
            return Err(Error::DuplicateExchange { name: entry.name });
        }
        let entry = Arc::new(entry);
        entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    /// Consistent point-in-time copy of every entry handle.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<ExchangeEntry>> {
        self.entries.read().clone()
    }

    /// Look up an exchange by name, ignoring case.
    pub fn get(&self, name: &str) -> Result<Arc<ExchangeEntry>> {
        self.entries
            .read()
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| Error::exchange_not_found(name))
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        let entry = self.get(name)?;
        entry.set_enabled(true);
        info!(exchange = %entry.name(), "Exchange enabled");
        Ok(())
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        let entry = self.get(name)?;
        entry.set_enabled(false);
        info!(exchange = %entry.name(), "Exchange disabled");
        Ok(())
    }

    #[must_use]
    pub fn enabled_names(&self) -> Vec<String> {
        self.names_where(true)
    }

    #[must_use]
    pub fn disabled_names(&self) -> Vec<String> {
        self.names_where(false)
    }

    #[must_use]
    pub fn count_enabled(&self) -> usize {
        self.entries.read().iter().filter(|e| e.is_enabled()).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn names_where(&self, enabled: bool) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.is_enabled() == enabled)
            .map(|e| e.name.clone())
            .collect()
    }
}
