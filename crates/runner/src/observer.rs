use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tally_broker::Broker;
use tally_core::Timestamp;

/// Observation key, e.g. `("portfolio", "nav")` or `("SPX", "EUR")`
pub type ObservationKey = (String, String);

pub const PORTFOLIO: &str = "portfolio";
pub const VARIABLE: &str = "variable";

/// Per-step recorder of broker state
///
/// Each `update` records the NAV in the default numeraire, the rate of every
/// account currency versus the numeraire, and all filter variables. Anything
/// else can be added with `save`, stamped with the time of the last update.
pub struct BrokerObserver {
    current: Timestamp,
    recent: BTreeMap<ObservationKey, Decimal>,
    history: BTreeMap<ObservationKey, Vec<(Timestamp, Decimal)>>,
}

impl BrokerObserver {
    pub fn new(broker: &Broker) -> Self {
        Self {
            current: broker.get_time(),
            recent: BTreeMap::new(),
            history: BTreeMap::new(),
        }
    }

    /// Record the broker's state at its current instant
    pub fn update(&mut self, broker: &Broker) {
        self.current = broker.get_time();
        self.recent.clear();

        let numeraire = broker.get_default_numeraire();
        match broker.get_nav() {
            Ok(nav) => self.save((PORTFOLIO, "nav"), nav),
            Err(e) => debug!("No NAV at {}: {}", self.current, e),
        }

        let currencies: BTreeSet<_> = broker
            .get_accounts()
            .into_values()
            .map(|(_, currency)| currency)
            .filter(|currency| currency != numeraire)
            .collect();
        for currency in currencies {
            match broker.get_cross_rate(&currency, numeraire) {
                Ok(rate) => self.save((currency.as_str(), numeraire.as_str()), rate),
                Err(e) => debug!("No {}/{} rate at {}: {}", currency, numeraire, self.current, e),
            }
        }

        for (name, value) in broker.get_variables() {
            self.save((VARIABLE, name.as_str()), value);
        }
    }

    /// Record an extra observation at the time of the last update
    pub fn save(&mut self, key: (&str, &str), value: Decimal) {
        let key = (key.0.to_string(), key.1.to_string());
        self.history.entry(key.clone()).or_default().push((self.current, value));
        self.recent.insert(key, value);
    }

    /// Observations made since the last update began
    pub fn recent_observations(&self) -> &BTreeMap<ObservationKey, Decimal> {
        &self.recent
    }

    pub fn recent(&self, key: (&str, &str)) -> Option<Decimal> {
        self.recent.get(&(key.0.to_string(), key.1.to_string())).copied()
    }

    /// Every observation ever recorded under `key`, oldest first
    pub fn history(&self, key: (&str, &str)) -> &[(Timestamp, Decimal)] {
        self.history
            .get(&(key.0.to_string(), key.1.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObservationKey> {
        self.history.keys()
    }
}
