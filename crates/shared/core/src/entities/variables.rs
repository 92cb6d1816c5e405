use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named scalar side-metrics accumulated by filters over one run
/// (e.g. total transaction cost paid)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, Decimal>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `delta` into `name`, starting from zero
    pub fn add(&mut self, name: &str, delta: Decimal) {
        *self.0.entry(name.to_string()).or_insert(Decimal::ZERO) += delta;
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn to_map(&self) -> BTreeMap<String, Decimal> {
        self.0.clone()
    }
}
