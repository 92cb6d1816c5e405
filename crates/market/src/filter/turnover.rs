use log::warn;
use rust_decimal::Decimal;
use tally_core::{Currency, Fill, FillSource};
use tally_ports::{Filter, FilterOutput, LedgerView};

/// Accumulates traded value per step into a variable
///
/// Every executed caller transfer contributes the absolute value it credited,
/// converted into `currency` at the step's instant.
pub struct TurnoverFilter {
    variable: String,
    currency: Currency,
}

impl TurnoverFilter {
    pub fn new(variable: impl Into<String>, currency: impl Into<Currency>) -> Self {
        Self {
            variable: variable.into(),
            currency: currency.into(),
        }
    }
}

impl Filter for TurnoverFilter {
    fn apply(&mut self, fills: &[Fill], view: &dyn LedgerView) -> FilterOutput {
        let mut traded = Decimal::ZERO;
        for fill in fills
            .iter()
            .filter(|f| f.source == FillSource::External && f.is_executed() && f.is_transfer())
        {
            let Some(credit) = &fill.credit else { continue };
            match view.cross_rate(&credit.currency, &self.currency) {
                Ok(rate) => traded += (credit.amount * rate).abs(),
                Err(e) => warn!("[TurnoverFilter] Fill #{} not counted: {}", fill.sequence, e),
            }
        }

        FilterOutput {
            orders: Vec::new(),
            variables: vec![(self.variable.clone(), traded)],
        }
    }

    fn name(&self) -> &str {
        "TurnoverFilter"
    }
}
