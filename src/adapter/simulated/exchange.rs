use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::debug;

use super::feed::SimulatedFeed;
use super::price::{depth, quote};
use crate::domain::account::{Account, AccountCurrencyInfo, AccountInfo};
use crate::domain::asset::AssetType;
use crate::domain::book::OrderBook;
use crate::domain::currency::CurrencyCode;
use crate::domain::order::{
    CancelAllOrdersResponse, OrderCancellation, OrderDetail, OrderRequest, OrderType,
    SubmitOrderResponse,
};
use crate::domain::pair::CurrencyPair;
use crate::domain::ticker::Ticker;
use crate::error::{Error, Result};
use crate::infrastructure::config::exchange::ExchangeConfig;
use crate::port::outbound::exchange::Exchange;
use crate::port::outbound::stream::WebsocketConnection;

/// Paper exchange serving configured pairs with derived prices.
pub struct SimulatedExchange {
    name: String,
    symbols: BTreeMap<AssetType, Vec<String>>,
    pairs: BTreeMap<AssetType, Vec<CurrencyPair>>,
    batching: bool,
    ticks: DashMap<(AssetType, CurrencyPair), u64>,
    balances: RwLock<BTreeMap<CurrencyCode, Decimal>>,
    orders: DashMap<String, OrderDetail>,
    feed: Option<Arc<SimulatedFeed>>,
}

impl SimulatedExchange {
    /// Build from an `[[exchanges]]` entry; pair strings use its format.
    pub fn from_config(config: &ExchangeConfig) -> Result<Self> {
        let mut symbols = BTreeMap::new();
        let mut pairs = BTreeMap::new();
        for (asset, assets) in &config.assets {
            symbols.insert(*asset, assets.available.clone());
            pairs.insert(*asset, assets.available_pairs()?);
        }

        let mut exchange = Self {
            name: config.name.clone(),
            symbols,
            pairs,
            batching: config.ticker_batching,
            ticks: DashMap::new(),
            balances: RwLock::new(BTreeMap::new()),
            orders: DashMap::new(),
            feed: None,
        };
        if config.websocket_enabled {
            exchange.feed = Some(Arc::new(SimulatedFeed::new(
                &config.name,
                exchange.pairs.clone(),
            )));
        }
        Ok(exchange)
    }

    /// Seed a paper balance reported by `account_info`.
    #[must_use]
    pub fn with_balance(self, currency: impl Into<CurrencyCode>, amount: Decimal) -> Self {
        self.balances.write().insert(currency.into(), amount);
        self
    }

    fn next_ticker(&self, pair: &CurrencyPair, asset: AssetType) -> Ticker {
        let tick = {
            let mut entry = self.ticks.entry((asset, pair.clone())).or_insert(0);
            *entry += 1;
            *entry
        };
        let last = quote(pair, tick);
        let (bids, asks) = depth(last);
        let mut ticker = Ticker::new(pair.clone(), asset, last).with_volume(Decimal::from(tick));
        if let (Some(bid), Some(ask)) = (bids.first(), asks.first()) {
            ticker.bid = bid.price;
            ticker.ask = ask.price;
        }
        ticker
    }

    fn listed(&self, pair: &CurrencyPair, asset: AssetType) -> Result<()> {
        let listed = self
            .pairs
            .get(&asset)
            .is_some_and(|pairs| pairs.iter().any(|p| p.matches_exact(pair)));
        if listed {
            Ok(())
        } else {
            Err(Error::exchange(&self.name, format!("pair {pair} {asset} not listed")))
        }
    }
}

#[async_trait]
impl Exchange for SimulatedExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn asset_types(&self) -> Vec<AssetType> {
        self.pairs.keys().copied().collect()
    }

    fn supports_ticker_batching(&self) -> bool {
        self.batching
    }

    fn websocket(&self) -> Option<Arc<dyn WebsocketConnection>> {
        self.feed
            .as_ref()
            .map(|feed| Arc::clone(feed) as Arc<dyn WebsocketConnection>)
    }

    async fn update_ticker(&self, pair: &CurrencyPair, asset: AssetType) -> Result<Vec<Ticker>> {
        self.listed(pair, asset)?;
        if !self.batching {
            return Ok(vec![self.next_ticker(pair, asset)]);
        }
        let all = self.pairs.get(&asset).map(Vec::as_slice).unwrap_or_default();
        Ok(all.iter().map(|p| self.next_ticker(p, asset)).collect())
    }

    async fn update_orderbook(&self, pair: &CurrencyPair, asset: AssetType) -> Result<OrderBook> {
        self.listed(pair, asset)?;
        let tick = self
            .ticks
            .get(&(asset, pair.clone()))
            .map_or(0, |t| *t);
        let (bids, asks) = depth(quote(pair, tick));
        Ok(OrderBook::with_levels(pair.clone(), asset, bids, asks))
    }

    async fn fetch_tradable_pairs(&self, asset: AssetType) -> Result<Vec<String>> {
        self.symbols.get(&asset).cloned().ok_or_else(|| Error::AssetNotSupported {
            exchange: self.name.clone(),
            asset,
        })
    }

    async fn account_info(&self) -> Result<AccountInfo> {
        let currencies = self
            .balances
            .read()
            .iter()
            .map(|(code, amount)| AccountCurrencyInfo::new(code, *amount, Decimal::ZERO))
            .collect();
        Ok(AccountInfo::new(
            &self.name,
            vec![Account {
                id: "paper".into(),
                currencies,
            }],
        ))
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<SubmitOrderResponse> {
        self.listed(&order.pair, order.asset)?;
        if order.amount <= Decimal::ZERO {
            return Err(Error::exchange(&self.name, "order amount must be positive"));
        }

        let order_id = uuid::Uuid::new_v4().to_string();
        let (price, executed) = match order.order_type {
            OrderType::Market => (quote(&order.pair, 0), order.amount),
            OrderType::Limit => (order.price, Decimal::ZERO),
        };
        self.orders.insert(
            order_id.clone(),
            OrderDetail {
                order_id: order_id.clone(),
                exchange: self.name.clone(),
                pair: order.pair.clone(),
                side: order.side,
                order_type: order.order_type,
                amount: order.amount,
                executed_amount: executed,
                price,
                placed_at: Utc::now(),
            },
        );
        debug!(exchange = %self.name, order_id = %order_id, side = %order.side, "Paper order placed");
        Ok(SubmitOrderResponse {
            order_id,
            placed: true,
        })
    }

    async fn cancel_order(&self, cancel: &OrderCancellation) -> Result<()> {
        self.orders
            .remove(&cancel.order_id)
            .map(|_| ())
            .ok_or_else(|| Error::exchange(&self.name, format!("order {} not found", cancel.order_id)))
    }

    async fn cancel_all_orders(&self, pair: &CurrencyPair) -> Result<CancelAllOrdersResponse> {
        self.orders.retain(|_, order| !order.pair.matches_exact(pair));
        Ok(CancelAllOrdersResponse::default())
    }

    async fn order_info(&self, order_id: &str) -> Result<OrderDetail> {
        self.orders
            .get(order_id)
            .map(|order| order.clone())
            .ok_or_else(|| Error::exchange(&self.name, format!("order {order_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderSide;
    use crate::infrastructure::config::exchange::AssetPairsConfig;
    use rust_decimal_macros::dec;

    fn config(batching: bool) -> ExchangeConfig {
        let mut assets = BTreeMap::new();
        assets.insert(
            AssetType::Spot,
            AssetPairsConfig {
                available: vec!["BTC-USD".into(), "ETH-USD".into()],
                enabled: vec!["BTC-USD".into()],
                delimiter: "-".into(),
                index: None,
                uppercase: true,
            },
        );
        ExchangeConfig {
            name: "paper".into(),
            enabled: true,
            rest_enabled: true,
            websocket_enabled: false,
            ticker_batching: batching,
            assets,
        }
    }

    fn btc_usd() -> CurrencyPair {
        CurrencyPair::new("BTC", "USD")
    }

    #[tokio::test]
    async fn batching_returns_every_listed_pair() {
        let single = SimulatedExchange::from_config(&config(false)).unwrap();
        let batched = SimulatedExchange::from_config(&config(true)).unwrap();

        assert_eq!(single.update_ticker(&btc_usd(), AssetType::Spot).await.unwrap().len(), 1);
        assert_eq!(batched.update_ticker(&btc_usd(), AssetType::Spot).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unlisted_pair_is_rejected() {
        let exchange = SimulatedExchange::from_config(&config(false)).unwrap();
        let pair = CurrencyPair::new("LTC", "USD");
        assert!(exchange.update_ticker(&pair, AssetType::Spot).await.is_err());
        assert!(exchange.update_orderbook(&pair, AssetType::Spot).await.is_err());
    }

    #[tokio::test]
    async fn paper_orders_round_trip() {
        let exchange = SimulatedExchange::from_config(&config(false)).unwrap();
        let placed = exchange
            .submit_order(&OrderRequest {
                pair: btc_usd(),
                asset: AssetType::Spot,
                side: OrderSide::Buy,
                order_type: OrderType::Limit,
                amount: dec!(0.5),
                price: dec!(59000),
                client_id: None,
            })
            .await
            .unwrap();

        let detail = exchange.order_info(&placed.order_id).await.unwrap();
        assert_eq!(detail.executed_amount, Decimal::ZERO);

        exchange.cancel_all_orders(&btc_usd()).await.unwrap();
        assert!(exchange.order_info(&placed.order_id).await.is_err());
    }

    #[tokio::test]
    async fn account_info_reports_seeded_balances() {
        let exchange = SimulatedExchange::from_config(&config(false))
            .unwrap()
            .with_balance("BTC", dec!(2));
        let info = exchange.account_info().await.unwrap();
        assert_eq!(info.currency_totals()[&CurrencyCode::new("BTC")], dec!(2));
    }
}
