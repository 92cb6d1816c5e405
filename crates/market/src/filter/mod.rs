//! Built-in filters
//!
//! Filters observe the fills of one step and may hand back orders and
//! variable increments. See [`tally_ports::Filter`].

mod fee;
mod transaction_cost;
mod turnover;

pub use fee::FeeModel;
pub use transaction_cost::TransactionCostFilter;
pub use turnover::TurnoverFilter;
