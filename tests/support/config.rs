use std::io::Write;

use arbiter::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

/// Two spot exchanges, both polled over REST, neither streaming.
pub const TWO_EXCHANGES: &str = r#"
[logging]
level = "debug"
format = "json"

[polling]
ticker_interval_secs = 1
orderbook_interval_secs = 1

[[exchanges]]
name = "alpha"
[exchanges.assets.spot]
available = ["BTC-USD", "ETH-USD", "ETH-BTC"]
enabled = ["BTC-USD", "ETH-USD"]

[[exchanges]]
name = "beta"
ticker_batching = true
[exchanges.assets.spot]
available = ["XBT_USD", "USD_ETH", "LTC_EUR"]
enabled = ["XBT_USD"]
delimiter = "_"
"#;

pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

pub fn two_exchange_config() -> Config {
    Config::parse_toml(TWO_EXCHANGES).expect("valid test config")
}
