use anyhow::Context;
use arbiter::infrastructure::bootstrap::{build_pollers, build_simulated, build_supervisor};
use arbiter::infrastructure::config::settings::Config;
use tokio::signal;
use tracing::{error, info};

const CONFIG_ENV: &str = "ARBITER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match Config::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config {path}: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!(config = %path, "arbiter starting");

    if let Err(e) = run(config).await {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }

    info!("arbiter stopped");
}

async fn run(config: Config) -> anyhow::Result<()> {
    let boot = build_simulated(&config).context("failed to build engine")?;
    let engine = boot.engine;
    info!(
        enabled = ?engine.enabled_exchanges(),
        disabled = ?engine.disabled_exchanges(),
        "Exchanges loaded"
    );

    let (ticker_poller, orderbook_poller) = build_pollers(&config, &engine);
    let mut loops = Vec::new();
    if config.polling.ticker_enabled {
        loops.push(tokio::spawn(async move { ticker_poller.run_ticker_updater().await }));
    }
    if config.polling.orderbook_enabled {
        loops.push(tokio::spawn(async move { orderbook_poller.run_orderbook_updater().await }));
    }

    let supervisor = build_supervisor(&config, &engine);
    if config.websocket.routine_enabled {
        supervisor.start();
    }

    signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    for handle in &loops {
        handle.abort();
    }
    supervisor.shutdown().await.context("websocket shutdown")?;
    Ok(())
}
