//! Portfolio ledger port.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::CurrencyCode;

/// A balance tracked for one exchange and currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAddress {
    pub exchange: String,
    pub currency: CurrencyCode,
    pub balance: Decimal,
}

/// Persisted record of per-exchange balances.
///
/// Exchange names are matched case-insensitively by implementations.
pub trait PortfolioLedger: Send + Sync {
    fn exchange_address_exists(&self, exchange: &str, currency: &CurrencyCode) -> bool;

    fn address_balance(&self, exchange: &str, currency: &CurrencyCode) -> Option<Decimal>;

    fn add_address(&self, address: PortfolioAddress);

    fn update_exchange_address_balance(
        &self,
        exchange: &str,
        currency: &CurrencyCode,
        balance: Decimal,
    );

    fn remove_exchange_address(&self, exchange: &str, currency: &CurrencyCode);

    /// Snapshot of every address.
    fn addresses(&self) -> Vec<PortfolioAddress>;
}
