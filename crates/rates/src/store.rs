use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tally_core::{Currency, CurrencyPair, Rate, Timestamp};
use tally_ports::{RateError, RateResult, RateSource};

use crate::error::SeriesResult;
use crate::series::RateSeries;

/// All rate series known to a simulation, indexed by pair
///
/// Currencies form an undirected graph whose edges are the stored pairs; a
/// lookup walks at most one intermediate node.
#[derive(Debug, Clone, Default)]
pub struct RateStore {
    series: HashMap<CurrencyPair, RateSeries>,

    /// Pairs whose series was derived by `add_inverse_series`
    derived: HashSet<CurrencyPair>,

    /// Adjacency between currencies that share a series (either direction)
    neighbors: BTreeMap<Currency, BTreeSet<Currency>>,

    /// Preferred pivot for triangulation
    numeraire: Option<Currency>,
}

impl RateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from raw (pair, samples) input, validating every series
    pub fn from_series<I>(input: I) -> SeriesResult<Self>
    where
        I: IntoIterator<Item = (CurrencyPair, Vec<(Timestamp, Rate)>)>,
    {
        let mut store = Self::new();
        for (pair, samples) in input {
            store.insert(RateSeries::new(pair, samples)?);
        }
        Ok(store)
    }

    /// Add or replace the series for its pair
    pub fn insert(&mut self, series: RateSeries) {
        let pair = series.pair().clone();

        // A derived reverse series would now be stale
        let inverse = pair.inverse();
        if self.derived.remove(&inverse) {
            self.series.remove(&inverse);
        }
        self.derived.remove(&pair);

        self.neighbors
            .entry(pair.base.clone())
            .or_default()
            .insert(pair.quote.clone());
        self.neighbors
            .entry(pair.quote.clone())
            .or_default()
            .insert(pair.base.clone());
        self.series.insert(pair, series);
    }

    /// Materialize the reverse-pair series for every stored pair
    ///
    /// Idempotent. Lookups already fall back to reciprocals, so this only
    /// saves the division at query time.
    pub fn add_inverse_series(&mut self) {
        let missing: Vec<RateSeries> = self
            .series
            .iter()
            .filter(|(pair, _)| !self.series.contains_key(&pair.inverse()))
            .map(|(_, series)| series.inverse())
            .collect();

        debug!("Adding {} inverse series", missing.len());
        for series in missing {
            let pair = series.pair().clone();
            self.series.insert(pair.clone(), series);
            self.derived.insert(pair);
        }
    }

    /// Set the preferred triangulation pivot
    pub fn set_numeraire(&mut self, numeraire: Option<Currency>) {
        self.numeraire = numeraire;
    }

    pub fn with_numeraire(mut self, numeraire: impl Into<Currency>) -> Self {
        self.numeraire = Some(numeraire.into());
        self
    }

    pub fn numeraire(&self) -> Option<&Currency> {
        self.numeraire.as_ref()
    }

    pub fn get(&self, pair: &CurrencyPair) -> Option<&RateSeries> {
        self.series.get(pair)
    }

    pub fn contains(&self, pair: &CurrencyPair) -> bool {
        self.series.contains_key(pair)
    }

    /// Whether the series for `pair` was derived rather than supplied
    pub fn is_derived(&self, pair: &CurrencyPair) -> bool {
        self.derived.contains(pair)
    }

    /// Number of stored series, derived ones included
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &Currency> {
        self.neighbors.keys()
    }

    /// Union of all sample timestamps, ascending
    pub fn timestamps(&self) -> BTreeSet<Timestamp> {
        self.series.values().flat_map(|s| s.timestamps()).collect()
    }

    pub fn earliest_timestamp(&self) -> Option<Timestamp> {
        self.series.values().filter_map(|s| s.first_timestamp()).min()
    }

    /// Rate along a single stored edge (either direction)
    ///
    /// None when the two currencies share no series at all.
    fn edge_rate(&self, from: &Currency, to: &Currency, at: Timestamp) -> Option<RateResult<Rate>> {
        let pair = CurrencyPair::new(from.clone(), to.clone());
        if let Some(series) = self.series.get(&pair) {
            return Some(
                series
                    .rate_at(at)
                    .ok_or(RateError::RateUnavailable { pair, at }),
            );
        }

        let inverse = pair.inverse();
        let series = self.series.get(&inverse)?;
        Some(
            series
                .rate_at(at)
                .map(|r| Decimal::ONE / r)
                .ok_or(RateError::RateUnavailable { pair: inverse, at }),
        )
    }

    /// Pivot candidates adjacent to both endpoints
    ///
    /// The numeraire comes first. Other common neighbours follow, in
    /// lexicographic order, only for `Hop::Any`.
    fn pivots(&self, from: &Currency, to: &Currency, hop: Hop) -> Vec<&Currency> {
        let (Some(from_adj), Some(to_adj)) = (self.neighbors.get(from), self.neighbors.get(to)) else {
            return Vec::new();
        };

        let numeraire = self
            .numeraire
            .as_ref()
            .filter(|n| from_adj.contains(*n) && to_adj.contains(*n));
        let mut pivots: Vec<&Currency> = numeraire.into_iter().collect();
        if hop == Hop::Any {
            pivots.extend(from_adj.intersection(to_adj).filter(|c| Some(*c) != numeraire));
        }
        pivots
    }

    fn resolve(&self, from: &Currency, to: &Currency, at: Timestamp, hop: Hop) -> RateResult<Rate> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        if let Some(result) = self.edge_rate(from, to, at) {
            return result;
        }

        let mut unavailable = None;
        for pivot in self.pivots(from, to, hop) {
            let (Some(first), Some(second)) = (self.edge_rate(from, pivot, at), self.edge_rate(pivot, to, at))
            else {
                continue;
            };
            match (first, second) {
                (Ok(a), Ok(b)) => return Ok(a * b),
                (Err(e), _) | (_, Err(e)) => {
                    unavailable.get_or_insert(e);
                }
            }
        }

        Err(unavailable.unwrap_or_else(|| RateError::NoConversionPath {
            from: from.clone(),
            to: to.clone(),
        }))
    }
}

/// Which intermediate currencies a lookup may pass through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    Numeraire,
    Any,
}

impl RateSource for RateStore {
    fn rate(&self, from: &Currency, to: &Currency, at: Timestamp) -> RateResult<Rate> {
        self.resolve(from, to, at, Hop::Numeraire)
    }

    fn cross_rate(&self, from: &Currency, to: &Currency, at: Timestamp) -> RateResult<Rate> {
        self.resolve(from, to, at, Hop::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn day(n: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn constant(rate: Decimal, days: i64) -> Vec<(Timestamp, Rate)> {
        (0..days).map(|t| (day(t), rate)).collect()
    }

    fn ccy(code: &str) -> Currency {
        Currency::new(code)
    }

    fn store() -> RateStore {
        RateStore::from_series([
            (CurrencyPair::new("EUR", "USD"), constant(dec!(2), 3)),
            (CurrencyPair::new("USD", "JPY"), constant(dec!(100), 3)),
            (CurrencyPair::new("SPX", "USD"), constant(dec!(2000), 3)),
        ])
        .unwrap()
    }

    #[test]
    fn test_direct_and_inverse() {
        let store = store();
        assert_eq!(store.rate(&ccy("EUR"), &ccy("USD"), day(1)), Ok(dec!(2)));
        assert_eq!(store.rate(&ccy("USD"), &ccy("EUR"), day(1)), Ok(dec!(0.5)));
        assert_eq!(store.rate(&ccy("JPY"), &ccy("JPY"), day(1)), Ok(dec!(1)));
    }

    #[test]
    fn test_tradable_rate_hops_only_through_numeraire() {
        let store = store();
        assert_eq!(
            store.rate(&ccy("EUR"), &ccy("JPY"), day(0)),
            Err(RateError::NoConversionPath {
                from: ccy("EUR"),
                to: ccy("JPY"),
            })
        );

        // The numeraire is an endpoint, so it cannot serve as the hop
        let store = store.with_numeraire("EUR");
        assert!(matches!(
            store.rate(&ccy("EUR"), &ccy("JPY"), day(0)),
            Err(RateError::NoConversionPath { .. })
        ));
        assert!(matches!(
            store.rate(&ccy("JPY"), &ccy("EUR"), day(0)),
            Err(RateError::NoConversionPath { .. })
        ));

        // EUR -> USD -> JPY
        let store = store.with_numeraire("USD");
        assert_eq!(store.rate(&ccy("EUR"), &ccy("JPY"), day(0)), Ok(dec!(200)));
    }

    #[test]
    fn test_cross_rate_hops_through_any_common_neighbour() {
        let store = store().with_numeraire("EUR");
        // EUR -> USD -> JPY
        assert_eq!(store.cross_rate(&ccy("EUR"), &ccy("JPY"), day(0)), Ok(dec!(200)));
        // SPX -> USD -> EUR
        assert_eq!(store.cross_rate(&ccy("SPX"), &ccy("EUR"), day(2)), Ok(dec!(1000)));
        assert_eq!(store.cross_rate(&ccy("EUR"), &ccy("USD"), day(2)), Ok(dec!(2)));
    }

    #[test]
    fn test_no_multi_hop() {
        let mut store = store();
        store.insert(RateSeries::new(CurrencyPair::new("JPY", "KRW"), constant(dec!(10), 3)).unwrap());
        // EUR -> USD -> JPY -> KRW needs two pivots
        assert_eq!(
            store.cross_rate(&ccy("EUR"), &ccy("KRW"), day(0)),
            Err(RateError::NoConversionPath {
                from: ccy("EUR"),
                to: ccy("KRW"),
            })
        );
        assert!(matches!(
            store.cross_rate(&ccy("GBP"), &ccy("EUR"), day(0)),
            Err(RateError::NoConversionPath { .. })
        ));
    }

    #[test]
    fn test_unavailable_before_first_sample() {
        let store = store();
        assert_eq!(
            store.rate(&ccy("EUR"), &ccy("USD"), day(-1)),
            Err(RateError::RateUnavailable {
                pair: CurrencyPair::new("EUR", "USD"),
                at: day(-1),
            })
        );
        assert!(matches!(
            store.cross_rate(&ccy("EUR"), &ccy("JPY"), day(-1)),
            Err(RateError::RateUnavailable { .. })
        ));
    }

    #[test]
    fn test_numeraire_pivot_preferred() {
        // EUR and GBP both quote against USD and CHF with inconsistent cross rates
        let store = RateStore::from_series([
            (CurrencyPair::new("EUR", "USD"), constant(dec!(2), 1)),
            (CurrencyPair::new("GBP", "USD"), constant(dec!(4), 1)),
            (CurrencyPair::new("EUR", "CHF"), constant(dec!(4), 1)),
            (CurrencyPair::new("GBP", "CHF"), constant(dec!(2), 1)),
        ])
        .unwrap();

        // Without a numeraire only valuation may hop; CHF sorts before USD
        assert!(store.rate(&ccy("EUR"), &ccy("GBP"), day(0)).is_err());
        assert_eq!(store.cross_rate(&ccy("EUR"), &ccy("GBP"), day(0)), Ok(dec!(2)));

        let store = store.with_numeraire("USD");
        assert_eq!(store.rate(&ccy("EUR"), &ccy("GBP"), day(0)), Ok(dec!(0.5)));
        assert_eq!(store.cross_rate(&ccy("EUR"), &ccy("GBP"), day(0)), Ok(dec!(0.5)));
    }

    #[test]
    fn test_add_inverse_series_idempotent() {
        let mut store = store();
        assert_eq!(store.len(), 3);
        store.add_inverse_series();
        assert_eq!(store.len(), 6);
        store.add_inverse_series();
        assert_eq!(store.len(), 6);

        let pair = CurrencyPair::new("USD", "EUR");
        assert!(store.is_derived(&pair));
        let inverse = store.get(&pair).unwrap();
        let original = store.get(&pair.inverse()).unwrap();
        assert!(inverse.timestamps().eq(original.timestamps()));
        assert_eq!(store.rate(&ccy("USD"), &ccy("EUR"), day(1)), Ok(dec!(0.5)));
    }

    #[test]
    fn test_insert_drops_stale_derived_series() {
        let mut store = store();
        store.add_inverse_series();
        store.insert(RateSeries::new(CurrencyPair::new("EUR", "USD"), constant(dec!(5), 3)).unwrap());
        assert!(!store.contains(&CurrencyPair::new("USD", "EUR")));
        assert_eq!(store.rate(&ccy("USD"), &ccy("EUR"), day(0)), Ok(dec!(0.2)));
    }

    #[test]
    fn test_timestamp_union() {
        let store = RateStore::from_series([
            (CurrencyPair::new("EUR", "USD"), vec![(day(0), dec!(1)), (day(2), dec!(1))]),
            (CurrencyPair::new("USD", "JPY"), vec![(day(1), dec!(1)), (day(2), dec!(1))]),
        ])
        .unwrap();
        let ts: Vec<_> = store.timestamps().into_iter().collect();
        assert_eq!(ts, vec![day(0), day(1), day(2)]);
        assert_eq!(store.earliest_timestamp(), Some(day(0)));
    }
}
