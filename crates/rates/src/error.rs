use tally_core::{CurrencyPair, Timestamp};
use thiserror::Error;

/// Rejected input at the loader boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Series {0} has no samples")]
    Empty(CurrencyPair),

    #[error("Series {pair} timestamps not strictly increasing at {at}")]
    NonIncreasingTimestamps { pair: CurrencyPair, at: Timestamp },

    #[error("Series {pair} has non-positive rate at {at}")]
    NonPositiveRate { pair: CurrencyPair, at: Timestamp },

    #[error("Series {pair} has a base equal to its quote")]
    DegeneratePair { pair: CurrencyPair },
}

pub type SeriesResult<T> = std::result::Result<T, SeriesError>;
