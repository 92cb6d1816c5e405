use tally_core::{Currency, Rate, Timestamp};

use crate::error::RateResult;

/// Port for exchange-rate lookup
///
/// The instant is always passed explicitly; implementations hold no notion of
/// "current" time.
pub trait RateSource {
    /// Units of `to` per one unit of `from`, as known at `at`
    ///
    /// Only quoted conversions: a direct or reverse series, or one hop
    /// through the numeraire. Orders execute at this rate.
    fn rate(&self, from: &Currency, to: &Currency, at: Timestamp) -> RateResult<Rate>;

    /// Rate used to mark value, which may hop through any shared currency
    fn cross_rate(&self, from: &Currency, to: &Currency, at: Timestamp) -> RateResult<Rate> {
        self.rate(from, to, at)
    }
}
