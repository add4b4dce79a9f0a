//! Composition root: turn a validated [`Config`] into a running engine.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::broadcast::ChannelBroadcaster;
use crate::adapter::simulated::SimulatedExchange;
use crate::application::aggregate::Engine;
use crate::application::registry::{ExchangeEntry, ExchangeRegistry, PairStore};
use crate::error::Result;
use crate::infrastructure::config::exchange::ExchangeConfig;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::exchange::Exchange;
use crate::runtime::poller::Poller;
use crate::runtime::websocket::WebsocketSupervisor;

/// Engine plus the relay handle subscribers attach to.
pub struct Bootstrapped {
    pub engine: Arc<Engine>,
    /// Present when `websocket.server_enabled` is set.
    pub relay: Option<ChannelBroadcaster>,
}

/// Wrap an exchange integration with its configured flags and pair stores.
///
/// Enabled pairs are reconciled against available pairs per asset type.
pub fn exchange_entry(config: &ExchangeConfig, exchange: Arc<dyn Exchange>) -> Result<ExchangeEntry> {
    let mut entry = ExchangeEntry::new(exchange)
        .with_enabled(config.enabled)
        .with_rest(config.rest_enabled)
        .with_websocket(config.websocket_enabled);

    for (asset, pairs) in &config.assets {
        let store = PairStore::new(pairs.available_pairs()?, pairs.enabled_pairs()?)
            .with_format(pairs.format());
        entry = entry.with_pairs(*asset, store);
    }

    for asset in config.assets.keys() {
        let report = entry.check_pair_consistency(*asset);
        if !report.is_unchanged() {
            info!(
                exchange = %config.name,
                asset = %asset,
                removed = report.removed.len(),
                "Reconciled enabled pairs at startup"
            );
        }
    }
    Ok(entry)
}

/// Register every configured exchange, creating integrations with `factory`.
pub fn build_registry<F>(configs: &[ExchangeConfig], factory: F) -> Result<ExchangeRegistry>
where
    F: Fn(&ExchangeConfig) -> Result<Arc<dyn Exchange>>,
{
    let registry = ExchangeRegistry::new();
    for config in configs {
        let exchange = factory(config)?;
        if exchange.name() != config.name {
            warn!(configured = %config.name, reported = %exchange.name(), "Exchange name mismatch");
        }
        registry.register(exchange_entry(config, exchange)?)?;
    }
    info!(
        exchanges = registry.len(),
        enabled = registry.count_enabled(),
        "Exchange registry built"
    );
    Ok(registry)
}

/// Build the engine, attaching a relay when the websocket server is on.
pub fn build_engine<F>(config: &Config, factory: F) -> Result<Bootstrapped>
where
    F: Fn(&ExchangeConfig) -> Result<Arc<dyn Exchange>>,
{
    let registry = Arc::new(build_registry(&config.exchanges, factory)?);
    let mut engine = Engine::new(registry, config.currency.classes()).with_display(config.currency.display());

    let relay = config
        .websocket
        .server_enabled
        .then(|| ChannelBroadcaster::new(config.websocket.broadcast_capacity));
    if let Some(relay) = &relay {
        engine = engine.with_broadcaster(Arc::new(relay.clone()));
    }

    Ok(Bootstrapped {
        engine: Arc::new(engine),
        relay,
    })
}

/// Build the engine over paper exchanges.
pub fn build_simulated(config: &Config) -> Result<Bootstrapped> {
    build_engine(config, |exchange| {
        let simulated: Arc<dyn Exchange> = Arc::new(SimulatedExchange::from_config(exchange)?);
        Ok(simulated)
    })
}

/// Ticker and order book pollers with their configured intervals.
#[must_use]
pub fn build_pollers(config: &Config, engine: &Arc<Engine>) -> (Poller, Poller) {
    let relay = config.websocket.server_enabled;
    let tickers = Poller::new(Arc::clone(engine))
        .with_interval(config.polling.ticker_interval())
        .with_relay(relay);
    let orderbooks = Poller::new(Arc::clone(engine))
        .with_interval(config.polling.orderbook_interval())
        .with_relay(relay);
    (tickers, orderbooks)
}

#[must_use]
pub fn build_supervisor(config: &Config, engine: &Arc<Engine>) -> WebsocketSupervisor {
    WebsocketSupervisor::new(Arc::clone(engine), config.websocket.supervisor_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::AssetType;
    use crate::domain::pair::CurrencyPair;

    const CONFIG: &str = r#"
        [websocket]
        server_enabled = true

        [[exchanges]]
        name = "alpha"
        [exchanges.assets.spot]
        available = ["BTC-USD", "ETH-USD"]
        enabled = ["BTC-USD", "LTC-USD"]

        [[exchanges]]
        name = "beta"
        enabled = false
        [exchanges.assets.spot]
        available = ["BTC_USD"]
        enabled = ["BTC_USD"]
        delimiter = "_"
    "#;

    #[test]
    fn simulated_engine_registers_every_exchange() {
        let config = Config::parse_toml(CONFIG).unwrap();
        let boot = build_simulated(&config).unwrap();

        assert_eq!(boot.engine.registry().len(), 2);
        assert_eq!(boot.engine.enabled_exchanges(), ["alpha"]);
        assert!(boot.relay.is_some());
        assert!(boot.engine.has_relay());
    }

    #[test]
    fn startup_drops_enabled_pairs_not_available() {
        let config = Config::parse_toml(CONFIG).unwrap();
        let boot = build_simulated(&config).unwrap();
        let alpha = boot.engine.registry().get("alpha").unwrap();

        assert_eq!(alpha.enabled_pairs(AssetType::Spot), vec![CurrencyPair::new("BTC", "USD")]);
    }
}
