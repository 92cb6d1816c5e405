//! Broker errors

use tally_ports::RateError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Rate error: {0}")]
    Rate(#[from] RateError),

    #[error("Portfolio value is zero; weights are undefined")]
    ZeroPortfolioValue,
}

pub type Result<T> = std::result::Result<T, BrokerError>;
