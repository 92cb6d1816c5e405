use log::{debug, info};
use std::collections::BTreeMap;
use tally_clock::{Clock, ReplayClock};
use tally_core::{Account, AccountName, Currency, Fill, Rate, Timestamp};
use tally_ports::{Filter, FilterOutput, LedgerView, RateResult, RateSource};
use tally_rates::RateStore;

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};

/// Outcome of one successful clock advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The instant the clock moved to
    pub time: Timestamp,
    /// Everything the filters asked for, in registration order
    pub output: FilterOutput,
}

/// Read-only ledger view at a fixed instant
pub struct MarketView<'a> {
    rates: &'a RateStore,
    at: Timestamp,
    accounts: &'a BTreeMap<AccountName, Account>,
}

impl<'a> MarketView<'a> {
    pub fn new(rates: &'a RateStore, at: Timestamp, accounts: &'a BTreeMap<AccountName, Account>) -> Self {
        Self { rates, at, accounts }
    }
}

impl LedgerView for MarketView<'_> {
    fn now(&self) -> Timestamp {
        self.at
    }

    fn rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate> {
        self.rates.rate(from, to, self.at)
    }

    fn cross_rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate> {
        self.rates.cross_rate(from, to, self.at)
    }

    fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }
}

/// Simulated market: rates as of the clock, plus the per-step filter pipeline
pub struct Market {
    rates: RateStore,
    clock: ReplayClock,
    filters: Vec<Box<dyn Filter>>,
    default_numeraire: Currency,
}

impl Market {
    /// Create a market over a fully materialized rate store
    ///
    /// # Arguments
    /// * `rates` - All series for the run
    /// * `filters` - Run once per step, in this order
    /// * `default_numeraire` - Preferred triangulation pivot and valuation currency
    /// * `start_time` - Initial clock value. If None, the earliest sample.
    pub fn new(
        mut rates: RateStore,
        filters: Vec<Box<dyn Filter>>,
        default_numeraire: impl Into<Currency>,
        start_time: Option<Timestamp>,
    ) -> Result<Self> {
        let default_numeraire = default_numeraire.into();
        rates.set_numeraire(Some(default_numeraire.clone()));

        let clock = ReplayClock::new(rates.timestamps(), start_time).ok_or(MarketError::NoData)?;

        info!(
            "Market created: {} series, {} filters, numeraire {}, starting at {}",
            rates.len(),
            filters.len(),
            default_numeraire,
            clock.now()
        );

        Ok(Self {
            rates,
            clock,
            filters,
            default_numeraire,
        })
    }

    /// Create a market from configuration, instantiating its filters
    pub fn from_config(rates: RateStore, config: &MarketConfig) -> Result<Self> {
        let filters = config.filters.iter().map(|f| f.build()).collect();
        Self::new(rates, filters, config.default_numeraire.clone(), config.start_time)
    }

    /// Register a filter after the existing ones
    pub fn add_filter(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Current simulated instant
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn default_numeraire(&self) -> &Currency {
        &self.default_numeraire
    }

    pub fn rates(&self) -> &RateStore {
        &self.rates
    }

    /// Units of `to` per one unit of `from` at the current instant, as
    /// orders execute
    pub fn get_rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate> {
        self.rates.rate(from, to, self.clock.now())
    }

    /// Valuation rate at the current instant
    pub fn get_cross_rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate> {
        self.rates.cross_rate(from, to, self.clock.now())
    }

    pub fn is_exhausted(&self) -> bool {
        self.clock.is_exhausted()
    }

    /// Advance the clock and run the filter pipeline
    ///
    /// `fills` are the ledger's fills since the previous step and `accounts`
    /// its balances; both are only read. Returns None, without running any
    /// filter, once no series has a later sample.
    pub fn advance(&mut self, fills: &[Fill], accounts: &BTreeMap<AccountName, Account>) -> Option<Step> {
        let Some(time) = self.clock.advance() else {
            info!("Market data exhausted at {}", self.clock.now());
            return None;
        };

        let view = MarketView::new(&self.rates, time, accounts);
        let mut output = FilterOutput::default();
        for filter in self.filters.iter_mut() {
            let result = filter.apply(fills, &view);
            if !result.is_empty() {
                debug!(
                    "Filter {} emitted {} orders, {} variable updates",
                    filter.name(),
                    result.orders.len(),
                    result.variables.len()
                );
            }
            output.extend(result);
        }

        Some(Step { time, output })
    }
}
