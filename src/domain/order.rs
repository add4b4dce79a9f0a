//! Order requests and responses passed through to exchanges.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::AssetType;
use super::pair::CurrencyPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    Market,
}

/// A new order to place on a single exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub pair: CurrencyPair,
    pub asset: AssetType,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: Decimal,
    /// Ignored for market orders.
    pub price: Decimal,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderResponse {
    pub order_id: String,
    pub placed: bool,
}

/// Identifies an order to cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancellation {
    pub order_id: String,
    pub pair: CurrencyPair,
    pub asset: AssetType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_id: String,
    pub exchange: String,
    pub pair: CurrencyPair,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: Decimal,
    pub executed_amount: Decimal,
    pub price: Decimal,
    pub placed_at: DateTime<Utc>,
}

/// Result of a bulk cancel; failed order ids map to the exchange's reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAllOrdersResponse {
    pub failures: BTreeMap<String, String>,
}

impl CancelAllOrdersResponse {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
