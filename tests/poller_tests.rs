mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use arbiter::domain::asset::AssetType;
use arbiter::runtime::poller::Poller;
use arbiter::testkit::domain::pair;
use arbiter::testkit::engine::{engine_with, spot_entry};
use arbiter::testkit::exchange::ScriptedExchange;

use support::wait::wait_until;

#[tokio::test]
async fn failing_exchange_does_not_block_siblings() {
    let engine = engine_with(vec![
        spot_entry(ScriptedExchange::new("broken").failing_tickers(), &["BTC-USD"]),
        spot_entry(ScriptedExchange::new("healthy"), &["BTC-USD"]),
    ]);

    let report = Poller::new(Arc::clone(&engine)).ticker_pass().await;

    assert_eq!(report.exchanges, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.updated, 1);
    let btc = pair("BTC-USD");
    assert!(engine.tickers().get("healthy", &btc, AssetType::Spot).is_some());
    assert!(engine.tickers().get("broken", &btc, AssetType::Spot).is_none());
}

#[tokio::test]
async fn panicking_exchange_is_contained() {
    let engine = engine_with(vec![
        spot_entry(ScriptedExchange::new("panics").panicking_tickers(), &["BTC-USD"]),
        spot_entry(ScriptedExchange::new("healthy"), &["BTC-USD", "ETH-USD"]),
    ]);

    let report = Poller::new(engine).ticker_pass().await;

    assert_eq!(report.panicked, 1);
    assert_eq!(report.updated, 2);
}

#[tokio::test]
async fn batching_exchange_hits_network_once_per_asset() {
    let batched = ScriptedExchange::new("batched").with_batching(vec!["BTC-USD", "ETH-USD", "LTC-USD"]);
    let batched_calls = batched.ticker_calls();
    let requested = batched.requested_pairs();
    let single = ScriptedExchange::new("single");
    let single_calls = single.ticker_calls();

    let pairs = ["BTC-USD", "ETH-USD", "LTC-USD"];
    let engine = engine_with(vec![spot_entry(batched, &pairs), spot_entry(single, &pairs)]);

    let report = Poller::new(Arc::clone(&engine)).ticker_pass().await;

    assert_eq!(report.updated, 6);
    assert_eq!(batched_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*requested.lock().unwrap(), vec![pair("BTC-USD")]);
    assert_eq!(single_calls.load(Ordering::SeqCst), 3);
    assert_eq!(engine.tickers().for_exchange("batched").len(), 3);
}

#[tokio::test]
async fn batching_falls_back_to_network_on_cache_miss() {
    let batched = ScriptedExchange::new("batched").with_batching(vec!["BTC-USD", "ETH-USD"]);
    let calls = batched.ticker_calls();
    let engine = engine_with(vec![spot_entry(batched, &["BTC-USD", "ETH-USD", "LTC-USD"])]);

    Poller::new(engine).ticker_pass().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn slow_exchange_delays_pass_without_cancelling_others() {
    let slow = ScriptedExchange::new("slow").with_ticker_delay(Duration::from_millis(50));
    let engine = engine_with(vec![
        spot_entry(slow, &["BTC-USD"]),
        spot_entry(ScriptedExchange::new("fast"), &["BTC-USD"]),
    ]);

    let report = Poller::new(Arc::clone(&engine)).ticker_pass().await;

    assert_eq!(report.updated, 2);
    assert_eq!(engine.tickers().len(), 2);
}

#[tokio::test]
async fn disable_takes_effect_on_next_pass() {
    let exchange = ScriptedExchange::new("alpha");
    let calls = exchange.orderbook_calls();
    let engine = engine_with(vec![spot_entry(exchange, &["BTC-USD"])]);
    let poller = Poller::new(Arc::clone(&engine));

    assert_eq!(poller.orderbook_pass().await.updated, 1);
    engine.disable_exchange("alpha").unwrap();
    let second = poller.orderbook_pass().await;

    assert_eq!(second.skipped, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_orderbooks_are_counted() {
    let engine = engine_with(vec![spot_entry(
        ScriptedExchange::new("alpha").failing_orderbooks(),
        &["BTC-USD", "ETH-USD"],
    )]);

    let report = Poller::new(Arc::clone(&engine)).orderbook_pass().await;

    assert_eq!(report.failed, 2);
    assert!(engine.orderbooks().is_empty());
}

#[tokio::test]
async fn updater_loop_keeps_polling() {
    let exchange = ScriptedExchange::new("alpha");
    let calls = exchange.ticker_calls();
    let engine = engine_with(vec![spot_entry(exchange, &["BTC-USD"])]);
    let poller = Poller::new(engine).with_interval(Duration::from_millis(5));

    let handle = tokio::spawn(async move { poller.run_ticker_updater().await });
    let polled_twice = wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) >= 2).await;
    handle.abort();

    assert!(polled_twice);
}
