use tally_core::{Currency, CurrencyPair, Timestamp};
use thiserror::Error;

/// No usable rate at the requested instant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("Rate for {pair} unavailable at {at}")]
    RateUnavailable { pair: CurrencyPair, at: Timestamp },

    #[error("No conversion path from {from} to {to}")]
    NoConversionPath { from: Currency, to: Currency },
}

pub type RateResult<T> = std::result::Result<T, RateError>;
