//! In-memory portfolio ledger.

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::domain::currency::CurrencyCode;
use crate::port::outbound::portfolio::{PortfolioAddress, PortfolioLedger};

/// Process-local ledger of exchange balance addresses.
#[derive(Debug, Default)]
pub struct Portfolio {
    addresses: RwLock<Vec<PortfolioAddress>>,
}

impl Portfolio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.read().is_empty()
    }
}

fn same_address(address: &PortfolioAddress, exchange: &str, currency: &CurrencyCode) -> bool {
    address.exchange.eq_ignore_ascii_case(exchange) && &address.currency == currency
}

impl PortfolioLedger for Portfolio {
    fn exchange_address_exists(&self, exchange: &str, currency: &CurrencyCode) -> bool {
        self.addresses
            .read()
            .iter()
            .any(|a| same_address(a, exchange, currency))
    }

    fn address_balance(&self, exchange: &str, currency: &CurrencyCode) -> Option<Decimal> {
        self.addresses
            .read()
            .iter()
            .find(|a| same_address(a, exchange, currency))
            .map(|a| a.balance)
    }

    fn add_address(&self, address: PortfolioAddress) {
        let mut addresses = self.addresses.write();
        match addresses
            .iter_mut()
            .find(|a| same_address(a, &address.exchange, &address.currency))
        {
            Some(existing) => existing.balance = address.balance,
            None => addresses.push(address),
        }
    }

    fn update_exchange_address_balance(
        &self,
        exchange: &str,
        currency: &CurrencyCode,
        balance: Decimal,
    ) {
        if let Some(address) = self
            .addresses
            .write()
            .iter_mut()
            .find(|a| same_address(a, exchange, currency))
        {
            address.balance = balance;
        }
    }

    fn remove_exchange_address(&self, exchange: &str, currency: &CurrencyCode) {
        self.addresses
            .write()
            .retain(|a| !same_address(a, exchange, currency));
    }

    fn addresses(&self) -> Vec<PortfolioAddress> {
        self.addresses.read().clone()
    }
}
