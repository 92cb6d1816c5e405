//! Tally Rate Store
//!
//! Holds one chronological series of samples per currency pair and answers
//! "how many units of B per unit of A at time T":
//!
//! 1. direct series (A, B), latest sample at or before T (carried forward)
//! 2. reverse series (B, A), reciprocal
//! 3. one hop through the numeraire N: rate(A, N) × rate(N, B)
//!
//! `rate` stops there and is what orders execute at. `cross_rate`, used for
//! valuation, may also hop through any other currency quoted against both
//! ends (numeraire first, then lexicographic).
//!
//! The store is fully materialized before a simulation starts and is never
//! mutated while one is running.

mod error;
mod series;
mod store;

pub use error::{SeriesError, SeriesResult};
pub use series::RateSeries;
pub use store::RateStore;

// Re-export the port for convenience
pub use tally_ports::{RateError, RateResult, RateSource};
