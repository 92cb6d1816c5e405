use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::AccountName;

use crate::error::{Result, RunnerError};

/// Rebalancing parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Account that funds every rebalancing transfer
    pub cash_account: AccountName,

    /// Minimum number of calendar days between two rebalancing decisions
    #[serde(default = "default_trade_every_n_days")]
    pub trade_every_n_days: i64,

    /// Total absolute weight deviation below which no rebalancing happens
    #[serde(default = "default_max_rel_alloc_deviation")]
    pub max_rel_alloc_deviation: Decimal,

    /// Trades worth less than this, in the numeraire, are dropped
    #[serde(default = "default_min_trade_value")]
    pub min_trade_value: Decimal,
}

fn default_trade_every_n_days() -> i64 {
    30
}

fn default_max_rel_alloc_deviation() -> Decimal {
    Decimal::new(1, 2)
}

fn default_min_trade_value() -> Decimal {
    Decimal::new(1, 2)
}

impl RunnerConfig {
    pub fn new(cash_account: impl Into<AccountName>) -> Self {
        Self {
            cash_account: cash_account.into(),
            trade_every_n_days: default_trade_every_n_days(),
            max_rel_alloc_deviation: default_max_rel_alloc_deviation(),
            min_trade_value: default_min_trade_value(),
        }
    }

    pub fn with_trade_every_n_days(mut self, days: i64) -> Self {
        self.trade_every_n_days = days;
        self
    }

    pub fn with_max_rel_alloc_deviation(mut self, deviation: Decimal) -> Self {
        self.max_rel_alloc_deviation = deviation;
        self
    }

    /// Parse and validate configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| RunnerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trade_every_n_days < 0 {
            return Err(RunnerError::Config(format!(
                "trade_every_n_days must not be negative, got {}",
                self.trade_every_n_days
            )));
        }
        if self.max_rel_alloc_deviation.is_sign_negative() || self.min_trade_value.is_sign_negative() {
            return Err(RunnerError::Config("thresholds must not be negative".to_string()));
        }
        Ok(())
    }
}
