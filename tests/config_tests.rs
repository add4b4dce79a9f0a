mod support;

use arbiter::domain::asset::AssetType;
use arbiter::domain::pair::CurrencyPair;
use arbiter::error::{ConfigError, Error};
use arbiter::infrastructure::config::settings::Config;

use support::config::{write_temp_config, TWO_EXCHANGES};

#[test]
fn config_loads_from_file() {
    let file = write_temp_config(TWO_EXCHANGES);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.logging.format, "json");
    assert_eq!(config.polling.ticker_interval().as_secs(), 1);
    assert_eq!(config.exchange_names(), ["alpha", "beta"]);

    let beta = &config.exchanges[1].assets[&AssetType::Spot];
    assert_eq!(
        beta.enabled_pairs().unwrap(),
        vec![CurrencyPair::new("XBT", "USD")]
    );
}

#[test]
fn config_missing_file_is_read_error() {
    let result = Config::load("/nonexistent/arbiter/config.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn config_malformed_toml_is_parse_error() {
    let file = write_temp_config("[polling\nticker_interval_secs = 1");
    let result = Config::load(file.path());
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn config_rejects_zero_polling_interval() {
    let toml = r#"
[polling]
orderbook_interval_secs = 0
"#;

    match Config::parse_toml(toml) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "polling.orderbook_interval_secs",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid interval error, got {err}"),
        Ok(_) => panic!("Expected zero interval to be rejected"),
    }
}

#[test]
fn config_rejects_zero_shutdown_timeout() {
    let toml = r#"
[websocket]
shutdown_timeout_ms = 0
"#;

    assert!(matches!(
        Config::parse_toml(toml),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "websocket.shutdown_timeout_ms",
            ..
        }))
    ));
}

#[test]
fn config_rejects_empty_stablecoin() {
    let toml = r#"
[currency]
stablecoin = " "
"#;

    assert!(matches!(
        Config::parse_toml(toml),
        Err(Error::Config(ConfigError::MissingField {
            field: "currency.stablecoin"
        }))
    ));
}

#[test]
fn config_index_format_requires_index_suffix() {
    let toml = r#"
[[exchanges]]
name = "alpha"
[exchanges.assets.futures]
available = ["BTCUSD", "ETHEUR"]
delimiter = ""
index = "USD"
"#;

    assert!(Config::parse_toml(toml).is_err());
}

#[test]
fn config_currency_section_drives_classes() {
    let toml = r#"
[currency]
stablecoin = "USDC"
fiat = ["USD", "EUR"]
crypto = ["BTC", "USDC"]
display_delimiter = "/"
display_uppercase = false
"#;

    let config = Config::parse_toml(toml).unwrap();
    let classes = config.currency.classes();
    assert_eq!(classes.stablecoin().as_str(), "USDC");
    assert_eq!(classes.fiat().len(), 2);

    let display = config.currency.display();
    assert_eq!(CurrencyPair::new("BTC", "EUR").format(&display), "btc/eur");
}

#[test]
fn example_config_is_valid() {
    let config = Config::parse_toml(include_str!("../config.toml.example")).unwrap();

    assert_eq!(config.exchange_names(), ["alpha", "beta"]);
    assert!(config.exchanges[1].assets.contains_key(&AssetType::Futures));
    assert_eq!(config.websocket.max_reconnect_attempts, None);
}
