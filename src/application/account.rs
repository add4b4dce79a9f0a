//! Balance collation and portfolio reconciliation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::domain::account::{AccountCurrencyInfo, AccountInfo};
use crate::domain::currency::CurrencyCode;
use crate::port::outbound::portfolio::{PortfolioAddress, PortfolioLedger};

/// Sum `total_value` and `hold` per currency across every account of every
/// exchange.
///
/// Decimal addition is exact, so the result does not depend on input order.
#[must_use]
pub fn collate_account_info_by_coin(
    accounts: &[AccountInfo],
) -> BTreeMap<CurrencyCode, AccountCurrencyInfo> {
    let mut totals: BTreeMap<CurrencyCode, AccountCurrencyInfo> = BTreeMap::new();
    for info in accounts
        .iter()
        .flat_map(|exchange| &exchange.accounts)
        .flat_map(|account| &account.currencies)
    {
        totals
            .entry(info.currency.clone())
            .and_modify(|total| {
                total.total_value += info.total_value;
                total.hold += info.hold;
            })
            .or_insert_with(|| info.clone());
    }
    totals
}

/// Changes applied to the ledger by [`reconcile_portfolio`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Upsert/prune the ledger against freshly fetched balances.
///
/// Balances are first summed per exchange and currency. A positive total
/// for an unknown address adds it; a non-positive total removes a known
/// address; a known address with a different balance is updated. Nothing
/// else changes, so the ledger may be ahead of, behind, or equal to the
/// fetch.
pub fn reconcile_portfolio(
    ledger: &dyn PortfolioLedger,
    data: &[AccountInfo],
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    for info in data {
        let exchange = info.exchange.as_str();
        for (currency, total) in info.currency_totals() {
            if !ledger.exchange_address_exists(exchange, &currency) {
                if total <= Decimal::ZERO {
                    continue;
                }
                info!(exchange, currency = %currency, balance = %total, "Portfolio: adding exchange address");
                ledger.add_address(PortfolioAddress {
                    exchange: exchange.to_string(),
                    currency,
                    balance: total,
                });
                summary.added += 1;
            } else if total <= Decimal::ZERO {
                info!(exchange, currency = %currency, "Portfolio: removing exchange address");
                ledger.remove_exchange_address(exchange, &currency);
                summary.removed += 1;
            } else {
                let Some(balance) = ledger.address_balance(exchange, &currency) else {
                    continue;
                };
                if balance != total {
                    info!(
                        exchange,
                        currency = %currency,
                        from = %balance,
                        to = %total,
                        "Portfolio: updating exchange address balance"
                    );
                    ledger.update_exchange_address_balance(exchange, &currency, total);
                    summary.updated += 1;
                } else {
                    debug!(exchange, currency = %currency, "Portfolio: balance unchanged");
                }
            }
        }
    }

    summary
}
