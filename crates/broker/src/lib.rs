//! Tally Broker - the ledger and order executor
//!
//! Owns the account map and is the only component that changes balances:
//!
//! - **fill_order**: executes an order immediately at the market's current
//!   instant (account creation, transfers, deposits, withdrawals)
//! - **next**: asks the market to advance, then executes whatever the
//!   filters handed back through the same execution path
//! - **valuation**: portfolio value, per-account value and weights in any
//!   currency the rate store can reach
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_broker::Broker;
//! use tally_core::Order;
//!
//! let mut broker = Broker::new(market, [Order::create_account("EUR_CASH", dec!(100), "EUR")])?;
//! broker.fill_order(Order::backward_transfer("EUR_CASH", "USD_CASH", dec!(10), "EUR"))?;
//! while broker.next().is_some() {}
//! ```

pub mod accounts;
pub mod broker;
pub mod error;
pub mod execution;

// Re-export main types
pub use accounts::AccountBook;
pub use broker::{Broker, BrokerState, OrderOutcome};
pub use error::{BrokerError, Result};
pub use execution::{Execute, ExecutionContext, Resolution};
