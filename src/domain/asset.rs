//! Market segment classifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Market segment a pair trades in on a given exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    #[default]
    Spot,
    Margin,
    Index,
    Binary,
    PerpetualSwap,
    Futures,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::Spot,
        AssetType::Margin,
        AssetType::Index,
        AssetType::Binary,
        AssetType::PerpetualSwap,
        AssetType::Futures,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::Margin => "margin",
            Self::Index => "index",
            Self::Binary => "binary",
            Self::PerpetualSwap => "perpetual_swap",
            Self::Futures => "futures",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|asset| asset.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown asset type '{s}'"))
    }
}
