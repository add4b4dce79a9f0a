//! Pair relatability: which pairs quote the same market under other symbols.
//!
//! Two pairs are relatable when one can be reached from the other by
//! swapping in translated symbols (`BTC-USD` and `XBT-USD`) or, for
//! crypto/fiat pairs, by substituting another fiat currency.

use crate::domain::currency::{CurrencyClasses, CurrencyCode};
use crate::domain::pair::{CurrencyPair, PairSet};
use crate::domain::translation::translate;

/// Relatability queries over a fixed set of currency classes.
#[derive(Debug, Clone, Default)]
pub struct PairRelations {
    classes: CurrencyClasses,
}

impl PairRelations {
    #[must_use]
    pub fn new(classes: CurrencyClasses) -> Self {
        Self { classes }
    }

    #[must_use]
    pub fn classes(&self) -> &CurrencyClasses {
        &self.classes
    }

    /// Every pair reachable from `pair` through the translation table.
    ///
    /// Both `pair` and its swap are expanded. Results are deduplicated by
    /// exact order. When `include_stablecoin` is false, every pair that
    /// contains the configured stablecoin is dropped, including `pair`.
    #[must_use]
    pub fn relatable_currencies(
        &self,
        pair: &CurrencyPair,
        include_original: bool,
        include_stablecoin: bool,
    ) -> PairSet {
        let mut pairs = PairSet::exact();
        expand_translations(&mut pairs, pair, include_original);
        expand_translations(&mut pairs, &pair.swap(), include_original);

        if !include_stablecoin {
            pairs.retain_without_currency(self.classes.stablecoin());
        }
        pairs
    }

    /// `pair`'s first currency quoted against every fiat currency, its
    /// current quote included.
    #[must_use]
    pub fn relatable_fiat_currencies(&self, pair: &CurrencyPair) -> PairSet {
        self.substitute_second(pair, self.classes.fiat())
    }

    /// `pair`'s first currency quoted against every cryptocurrency, its
    /// current quote included. The self pair (`BTC-BTC`) is never produced.
    #[must_use]
    pub fn relatable_cryptocurrencies(&self, pair: &CurrencyPair) -> PairSet {
        self.substitute_second(pair, self.classes.crypto())
    }

    /// Whether `p2` quotes the same market as `p1`.
    ///
    /// True when they match in either order or `p2` is among `p1`'s
    /// relatable pairs. For crypto/fiat pairs, each relatable pair is first
    /// widened with its fiat substitutions.
    #[must_use]
    pub fn is_relatable_pairs(
        &self,
        p1: &CurrencyPair,
        p2: &CurrencyPair,
        include_stablecoin: bool,
    ) -> bool {
        if p1.matches_either_order(p2) {
            return true;
        }

        let mut relatable = self.relatable_currencies(p1, true, include_stablecoin);
        if self.classes.is_crypto_fiat_pair(p1) {
            let widened: Vec<CurrencyPair> = relatable
                .iter()
                .flat_map(|r| self.relatable_fiat_currencies(r))
                .collect();
            relatable.extend(widened);
        }

        relatable.iter().any(|r| r.matches_either_order(p2))
    }

    fn substitute_second(&self, pair: &CurrencyPair, candidates: &[CurrencyCode]) -> PairSet {
        let mut pairs = PairSet::either_order();
        for candidate in candidates {
            if candidate == pair.first() {
                continue;
            }
            pairs.insert(CurrencyPair::with_delimiter(
                pair.first(),
                candidate,
                pair.delimiter(),
            ));
        }
        pairs
    }
}

fn expand_translations(pairs: &mut PairSet, pair: &CurrencyPair, include_original: bool) {
    if include_original {
        pairs.insert(pair.clone());
    }

    let translated_second = translate(pair.second());
    if let Some(first) = translate(pair.first()) {
        pairs.insert(CurrencyPair::new(first.clone(), pair.second()));
        if let Some(second) = &translated_second {
            pairs.insert(CurrencyPair::new(first, second));
        }
    }
    if let Some(second) = translated_second {
        pairs.insert(CurrencyPair::new(pair.first(), second));
    }
}
