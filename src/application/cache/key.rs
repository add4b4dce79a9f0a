use crate::domain::asset::AssetType;
use crate::domain::pair::CurrencyPair;

/// Cache key. The exchange name is lower-cased so lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketKey {
    pub exchange: String,
    pub pair: CurrencyPair,
    pub asset: AssetType,
}

impl MarketKey {
    pub fn new(exchange: &str, pair: &CurrencyPair, asset: AssetType) -> Self {
        Self {
            exchange: exchange.to_ascii_lowercase(),
            pair: pair.clone(),
            asset,
        }
    }
}
