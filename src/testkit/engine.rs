//! Registry and engine fixtures.

use std::sync::Arc;

use super::domain::pairs;
use super::exchange::ScriptedExchange;
use crate::application::aggregate::Engine;
use crate::application::registry::{ExchangeEntry, ExchangeRegistry, PairStore};
use crate::domain::asset::AssetType;
use crate::domain::currency::CurrencyClasses;

/// Entry for `exchange` with `available` spot pairs, all enabled.
pub fn spot_entry(exchange: ScriptedExchange, available: &[&str]) -> ExchangeEntry {
    let pairs = pairs(available);
    ExchangeEntry::new(Arc::new(exchange))
        .with_pairs(AssetType::Spot, PairStore::new(pairs.clone(), pairs))
}

/// Engine over `entries` with default currency classes.
pub fn engine_with(entries: Vec<ExchangeEntry>) -> Arc<Engine> {
    let registry = Arc::new(ExchangeRegistry::new());
    for entry in entries {
        registry
            .register(entry)
            .unwrap_or_else(|e| panic!("test registry: {e}"));
    }
    Arc::new(Engine::new(registry, CurrencyClasses::default()))
}
