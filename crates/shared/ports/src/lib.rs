//! Tally Ports
//!
//! Port definitions (traits) for the Tally ledger simulator.
//! These define the boundaries between the ledger, the market time engine,
//! the rate store and pluggable filters.

mod clock;
mod error;
mod filter;
mod rates;

pub use clock::Clock;
pub use error::{RateError, RateResult};
pub use filter::{Filter, FilterOutput, LedgerView};
pub use rates::RateSource;
