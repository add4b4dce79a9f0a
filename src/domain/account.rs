//! Exchange account balances.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;

/// Balance of one currency inside one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCurrencyInfo {
    pub currency: CurrencyCode,
    pub total_value: Decimal,
    pub hold: Decimal,
}

impl AccountCurrencyInfo {
    #[must_use]
    pub fn new(currency: impl Into<CurrencyCode>, total_value: Decimal, hold: Decimal) -> Self {
        Self {
            currency: currency.into(),
            total_value,
            hold,
        }
    }

    /// Amount not locked in open orders.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.total_value - self.hold
    }
}

/// A sub-account on an exchange (main, margin, trading, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub currencies: Vec<AccountCurrencyInfo>,
}

/// Every account an exchange reports for the configured credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub exchange: String,
    pub accounts: Vec<Account>,
}

impl AccountInfo {
    #[must_use]
    pub fn new(exchange: impl Into<String>, accounts: Vec<Account>) -> Self {
        Self {
            exchange: exchange.into(),
            accounts,
        }
    }

    /// Total value per currency summed over all accounts.
    #[must_use]
    pub fn currency_totals(&self) -> BTreeMap<CurrencyCode, Decimal> {
        let mut totals = BTreeMap::new();
        for info in self.accounts.iter().flat_map(|a| &a.currencies) {
            *totals.entry(info.currency.clone()).or_insert(Decimal::ZERO) += info.total_value;
        }
        totals
    }
}
