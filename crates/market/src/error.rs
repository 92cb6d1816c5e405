use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("No rate data and no start time: cannot initialize the clock")]
    NoData,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, MarketError>;
