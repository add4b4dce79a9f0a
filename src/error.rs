use thiserror::Error;

use crate::domain::asset::AssetType;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("exchange {name}: not found")]
    ExchangeNotFound { name: String },

    #[error("exchange {name}: already registered")]
    DuplicateExchange { name: String },

    #[error("exchange {exchange} does not support asset type {asset}")]
    AssetNotSupported { exchange: String, asset: AssetType },

    #[error("invalid currency pair '{input}': {reason}")]
    PairParse { input: String, reason: String },

    #[error("exchange {exchange}: {reason}")]
    Exchange { exchange: String, reason: String },

    #[error("exchange {exchange} does not support {operation}")]
    NotSupported {
        exchange: String,
        operation: &'static str,
    },

    #[error("no price stats for {pair} {asset}")]
    NoPriceStats { pair: String, asset: AssetType },

    #[error("websocket error: {0}")]
    Websocket(String),

    #[error("websocket routines failed to stop within {timeout_ms}ms ({pending} still running)")]
    ShutdownTimeout { timeout_ms: u64, pending: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an exchange-scoped failure.
    pub fn exchange(exchange: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Exchange {
            exchange: exchange.into(),
            reason: reason.into(),
        }
    }

    /// Build a not-found error for a named exchange.
    pub fn exchange_not_found(name: impl Into<String>) -> Self {
        Self::ExchangeNotFound { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
