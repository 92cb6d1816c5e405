//! Market configuration
//!
//! Supports JSON configuration for:
//! - The default numeraire (triangulation pivot, valuation currency)
//! - An optional start time
//! - The ordered filter pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_core::{AccountName, Currency, Timestamp};
use tally_ports::Filter;
use thiserror::Error;

use crate::filter::{FeeModel, TransactionCostFilter, TurnoverFilter};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Root configuration for a market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Currency for default valuation and preferred triangulation pivot
    pub default_numeraire: Currency,

    /// Initial clock value; earliest sample when absent
    #[serde(default)]
    pub start_time: Option<Timestamp>,

    /// Filters, run in this order every step
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl MarketConfig {
    pub fn new(default_numeraire: impl Into<Currency>) -> Self {
        Self {
            default_numeraire: default_numeraire.into(),
            start_time: None,
            filters: Vec::new(),
        }
    }

    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filters.push(filter);
        self
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Declarative description of one filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    TransactionCost {
        fee_account: AccountName,
        fee: FeeModel,
        variable: String,
        watched_accounts: Vec<AccountName>,
        #[serde(default)]
        collector: Option<AccountName>,
    },
    Turnover {
        variable: String,
        currency: Currency,
    },
}

impl FilterConfig {
    /// Instantiate the filter
    pub fn build(&self) -> Box<dyn Filter> {
        match self {
            FilterConfig::TransactionCost {
                fee_account,
                fee,
                variable,
                watched_accounts,
                collector,
            } => {
                let filter = TransactionCostFilter::new(
                    fee_account.clone(),
                    fee.clone(),
                    variable.clone(),
                    watched_accounts.iter().cloned(),
                );
                match collector {
                    Some(collector) => Box::new(filter.with_collector(collector.clone())),
                    None => Box::new(filter),
                }
            }
            FilterConfig::Turnover { variable, currency } => {
                Box::new(TurnoverFilter::new(variable.clone(), currency.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_minimal_config() {
        let config = MarketConfig::from_json(r#"{ "default_numeraire": "EUR" }"#).unwrap();
        assert_eq!(config, MarketConfig::new("EUR"));
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "default_numeraire": "EUR",
            "start_time": "2000-01-01T00:00:00Z",
            "filters": [
                {
                    "type": "transaction_cost",
                    "fee_account": "EUR_CASH",
                    "fee": { "kind": "fixed", "amount": "5" },
                    "variable": "tc",
                    "watched_accounts": ["EUR_CASH", "USD_CASH"]
                },
                {
                    "type": "transaction_cost",
                    "fee_account": "USD_CASH",
                    "fee": { "kind": "proportional", "bps": "10" },
                    "variable": "tc_usd",
                    "watched_accounts": ["USD_CASH"],
                    "collector": "BROKER"
                },
                { "type": "turnover", "variable": "turnover", "currency": "EUR" }
            ]
        }"#;
        let config = MarketConfig::from_json(json).unwrap();

        assert_eq!(config.start_time, Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(config.filters.len(), 3);
        assert_eq!(
            config.filters[0],
            FilterConfig::TransactionCost {
                fee_account: "EUR_CASH".to_string(),
                fee: FeeModel::fixed(dec!(5)),
                variable: "tc".to_string(),
                watched_accounts: vec!["EUR_CASH".to_string(), "USD_CASH".to_string()],
                collector: None,
            }
        );
        assert!(matches!(
            &config.filters[1],
            FilterConfig::TransactionCost { fee: FeeModel::Proportional { min_fee, .. }, collector: Some(_), .. }
                if min_fee.is_zero()
        ));

        let names: Vec<String> = config.filters.iter().map(|f| f.build().name().to_string()).collect();
        assert_eq!(names, vec!["TransactionCostFilter", "TransactionCostFilter", "TurnoverFilter"]);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            MarketConfig::from_json(r#"{ "filters": [] }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            MarketConfig::from_file("/nonexistent/market.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
