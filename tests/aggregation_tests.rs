mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use arbiter::domain::account::{Account, AccountCurrencyInfo, AccountInfo};
use arbiter::domain::asset::AssetType;
use arbiter::domain::currency::CurrencyCode;
use arbiter::domain::pair::CurrencyPair;
use arbiter::error::{Error, Result};
use arbiter::infrastructure::bootstrap::{build_engine, Bootstrapped};
use arbiter::infrastructure::config::exchange::ExchangeConfig;
use arbiter::infrastructure::config::settings::Config;
use arbiter::port::outbound::exchange::Exchange;
use arbiter::port::outbound::portfolio::PortfolioLedger;
use arbiter::runtime::poller::Poller;
use arbiter::testkit::domain::pair;
use arbiter::testkit::exchange::ScriptedExchange;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::config::two_exchange_config;

fn account(exchange: &str, balances: &[(&str, Decimal)]) -> AccountInfo {
    AccountInfo::new(
        exchange,
        vec![Account {
            id: "main".into(),
            currencies: balances
                .iter()
                .map(|(code, total)| AccountCurrencyInfo::new(*code, *total, Decimal::ZERO))
                .collect(),
        }],
    )
}

/// alpha quotes 100, beta quotes 110 and batches its tickers.
fn scripted(config: &ExchangeConfig) -> Result<Arc<dyn Exchange>> {
    let exchange = match config.name.as_str() {
        "alpha" => ScriptedExchange::new("alpha")
            .with_price(dec!(100))
            .with_account_info(account("alpha", &[("BTC", dec!(1))])),
        "beta" => ScriptedExchange::new("beta")
            .with_price(dec!(110))
            .with_batching(vec!["XBT-USD", "USD-ETH"])
            .with_account_info(account("beta", &[("BTC", dec!(2)), ("USD", dec!(0))])),
        other => return Err(Error::exchange_not_found(other)),
    };
    Ok(Arc::new(exchange))
}

fn boot(config: &Config) -> Bootstrapped {
    build_engine(config, scripted).unwrap()
}

#[test]
fn all_available_pairs_dedupes_in_either_order() {
    let engine = boot(&two_exchange_config()).engine;

    let pairs = engine.all_available_pairs(false, AssetType::Spot);

    // beta's USD_ETH duplicates alpha's ETH-USD.
    assert_eq!(
        pairs.as_slice(),
        &[pair("BTC-USD"), pair("ETH-USD"), pair("ETH-BTC"), pair("XBT-USD"), pair("LTC-EUR")]
    );
}

#[test]
fn disabled_exchanges_drop_out_of_enabled_queries() {
    let engine = boot(&two_exchange_config()).engine;

    engine.disable_exchange("BETA").unwrap();

    assert_eq!(engine.all_available_pairs(true, AssetType::Spot).len(), 3);
    assert_eq!(engine.all_available_pairs(false, AssetType::Spot).len(), 5);
    assert_eq!(engine.disabled_exchanges(), ["beta"]);
    assert_eq!(engine.count_enabled_exchanges(), 1);
}

#[test]
fn map_currencies_by_exchange_matches_either_order() {
    let engine = boot(&two_exchange_config()).engine;

    let mapped = engine.map_currencies_by_exchange(
        &[pair("ETH-USD"), pair("XBT-USD")],
        false,
        AssetType::Spot,
    );

    assert_eq!(mapped["alpha"].as_slice(), &[pair("ETH-USD")]);
    assert_eq!(mapped["beta"].as_slice(), &[pair("ETH-USD"), pair("XBT-USD")]);
    assert_eq!(
        engine.exchange_names_by_currency(&pair("ETH-USD"), true, AssetType::Spot),
        ["alpha", "beta"]
    );
}

#[test]
fn exchange_names_by_currency_agrees_with_map_and_splits_on_enabled_flag() {
    let engine = boot(&two_exchange_config()).engine;
    let xbt_usd = pair("XBT-USD");

    let mapped = engine.map_currencies_by_exchange(&[xbt_usd.clone()], true, AssetType::Spot);
    let names = engine.exchange_names_by_currency(&xbt_usd, true, AssetType::Spot);
    assert_eq!(mapped.keys().collect::<Vec<_>>(), names.iter().collect::<Vec<_>>());
    assert!(engine
        .exchange_names_by_currency(&xbt_usd, false, AssetType::Spot)
        .is_empty());

    engine.disable_exchange("beta").unwrap();
    assert!(engine
        .exchange_names_by_currency(&xbt_usd, true, AssetType::Spot)
        .is_empty());
    assert_eq!(
        engine.exchange_names_by_currency(&pair("USD-XBT"), false, AssetType::Spot),
        ["beta"]
    );
}

#[test]
fn unknown_exchange_is_a_typed_error() {
    let engine = boot(&two_exchange_config()).engine;
    assert!(matches!(engine.enable_exchange("gamma"), Err(Error::ExchangeNotFound { .. })));
    assert!(matches!(
        engine.cryptocurrencies_by_exchange("gamma", false, false, AssetType::Spot),
        Err(Error::ExchangeNotFound { .. })
    ));
}

#[tokio::test]
async fn price_stats_rank_exchanges_after_a_pass() {
    let engine = boot(&two_exchange_config()).engine;
    let btc_usd = pair("BTC-USD");

    assert!(matches!(
        engine.exchange_with_highest_price(&btc_usd, AssetType::Spot),
        Err(Error::NoPriceStats { .. })
    ));

    Poller::new(Arc::clone(&engine)).ticker_pass().await;

    // beta quotes XBT, which is recorded under BTC as well.
    assert_eq!(engine.exchange_with_highest_price(&btc_usd, AssetType::Spot).unwrap(), "beta");
    assert_eq!(engine.exchange_with_lowest_price(&btc_usd, AssetType::Spot).unwrap(), "alpha");
}

#[tokio::test]
async fn relayed_tickers_reach_subscribers() {
    let mut config = two_exchange_config();
    config.websocket.server_enabled = true;
    let Bootstrapped { engine, relay } = boot(&config);
    let mut rx = relay.expect("relay enabled").subscribe();

    let report = Poller::new(Arc::clone(&engine)).with_relay(true).ticker_pass().await;
    assert_eq!(report.updated, 3);

    let mut exchanges = Vec::new();
    for _ in 0..3 {
        let json: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(json["event"], "ticker_update");
        exchanges.push(json["exchange"].as_str().unwrap().to_string());
    }
    exchanges.sort();
    assert_eq!(exchanges, ["alpha", "alpha", "beta"]);
}

#[tokio::test]
async fn active_tickers_cover_enabled_pairs() {
    let engine = boot(&two_exchange_config()).engine;
    Poller::new(Arc::clone(&engine)).ticker_pass().await;

    let active = engine.active_tickers().await;

    assert_eq!(active.len(), 2);
    assert_eq!(active[0].exchange, "alpha");
    assert_eq!(active[0].tickers.len(), 2);
    assert_eq!(active[1].tickers[0].pair, CurrencyPair::new("XBT", "USD"));
}

#[tokio::test]
async fn active_orderbooks_skip_failures_and_disabled_exchanges() {
    let config = two_exchange_config();
    let engine = build_engine(&config, |c| {
        Ok(Arc::new(ScriptedExchange::new(&c.name).failing_orderbooks()))
    })
    .unwrap()
    .engine;
    let healthy = boot(&config).engine;

    let failing = engine.active_orderbooks().await;
    assert_eq!(failing.len(), 2);
    assert!(failing.iter().all(|e| e.orderbooks.is_empty()));

    healthy.disable_exchange("beta").unwrap();
    let books = healthy.active_orderbooks().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].exchange, "alpha");
    assert_eq!(books[0].orderbooks.len(), 2);
}

#[tokio::test]
async fn specific_orderbook_is_cache_first() {
    let alpha = ScriptedExchange::new("alpha");
    let calls = alpha.orderbook_calls();
    let alpha: Arc<dyn Exchange> = Arc::new(alpha);
    let config = two_exchange_config();
    let engine = build_engine(&config, |c| {
        if c.name == "alpha" {
            Ok(Arc::clone(&alpha))
        } else {
            scripted(c)
        }
    })
    .unwrap()
    .engine;

    let first = engine.specific_orderbook("BTC-USD", "ALPHA", AssetType::Spot).await.unwrap();
    let second = engine.specific_orderbook("BTC-USD", "alpha", AssetType::Spot).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn account_info_collates_and_seeds_portfolio() {
    let engine = boot(&two_exchange_config()).engine;

    let accounts = engine.all_enabled_account_info().await;
    assert_eq!(accounts.len(), 2);

    let by_coin = engine.collate_account_info_by_coin(&accounts);
    assert_eq!(by_coin[&CurrencyCode::new("BTC")].total_value, dec!(3));

    let summary = engine.seed_exchange_account_info(&accounts);
    assert_eq!(summary.added, 2);
    assert_eq!(engine.portfolio().addresses().len(), 2);

    let again = engine.seed_exchange_account_info(&accounts);
    assert_eq!((again.added, again.updated, again.removed), (0, 0, 0));
}

#[tokio::test]
async fn update_exchange_pairs_reports_unknown_exchange() {
    let engine = boot(&two_exchange_config()).engine;
    let err = engine.update_exchange_pairs("gamma", AssetType::Spot).await.unwrap_err();
    assert!(matches!(err, Error::ExchangeNotFound { .. }));
}
