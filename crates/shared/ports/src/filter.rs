use rust_decimal::Decimal;
use tally_core::{Account, Currency, Fill, Order, Rate, Timestamp};

use crate::error::RateResult;

/// Read-only view of the ledger handed to filters during a time step
///
/// Rates are resolved at `now()`, the instant the clock just advanced to.
pub trait LedgerView {
    fn now(&self) -> Timestamp;

    /// Units of `to` per one unit of `from` at `now()`, as orders execute
    fn rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate>;

    /// Valuation rate at `now()`
    fn cross_rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate>;

    fn account(&self, name: &str) -> Option<&Account>;
}

/// What a filter asks the ledger to do after observing a step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutput {
    /// Orders routed back through the ledger's normal execution path
    pub orders: Vec<Order>,
    /// Increments added to the named variables
    pub variables: Vec<(String, Decimal)>,
}

impl FilterOutput {
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.variables.is_empty()
    }

    /// Append another filter's output, keeping order
    pub fn extend(&mut self, other: FilterOutput) {
        self.orders.extend(other.orders);
        self.variables.extend(other.variables);
    }
}

/// Port for step observers that may inject orders and record side metrics
///
/// Filters never touch balances directly; anything they want to change goes
/// through `FilterOutput::orders`.
pub trait Filter {
    /// Observe the caller's submissions since the previous step
    ///
    /// Skipped orders are included, marked `FillStatus::Skipped`.
    fn apply(&mut self, fills: &[Fill], view: &dyn LedgerView) -> FilterOutput;

    /// Get the filter's name for debugging
    fn name(&self) -> &str;
}
