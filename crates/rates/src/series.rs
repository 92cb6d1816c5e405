use rust_decimal::Decimal;
use tally_core::{CurrencyPair, Rate, Timestamp};

use crate::error::{SeriesError, SeriesResult};

/// Chronological (timestamp, rate) samples for one currency pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSeries {
    pair: CurrencyPair,
    /// Strictly increasing timestamps, positive rates
    samples: Vec<(Timestamp, Rate)>,
}

impl RateSeries {
    /// Create a validated series
    pub fn new(pair: CurrencyPair, samples: Vec<(Timestamp, Rate)>) -> SeriesResult<Self> {
        if pair.base == pair.quote {
            return Err(SeriesError::DegeneratePair { pair });
        }
        if samples.is_empty() {
            return Err(SeriesError::Empty(pair));
        }
        for (i, (at, rate)) in samples.iter().enumerate() {
            if *rate <= Decimal::ZERO {
                return Err(SeriesError::NonPositiveRate { pair, at: *at });
            }
            if i > 0 && samples[i - 1].0 >= *at {
                return Err(SeriesError::NonIncreasingTimestamps { pair, at: *at });
            }
        }
        Ok(Self { pair, samples })
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    pub fn samples(&self) -> &[(Timestamp, Rate)] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.samples.first().map(|(t, _)| *t)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.samples.iter().map(|(t, _)| *t)
    }

    /// Latest sample at or before `at`; None if `at` precedes the first sample
    pub fn rate_at(&self, at: Timestamp) -> Option<Rate> {
        let idx = self.samples.partition_point(|(t, _)| *t <= at);
        if idx == 0 {
            None
        } else {
            Some(self.samples[idx - 1].1)
        }
    }

    /// Reverse-pair series, pointwise reciprocal on the same timestamps
    pub fn inverse(&self) -> Self {
        Self {
            pair: self.pair.inverse(),
            samples: self
                .samples
                .iter()
                .map(|(t, r)| (*t, Decimal::ONE / *r))
                .collect(),
        }
    }
}
