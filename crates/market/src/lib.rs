//! Tally Market - the simulation time engine
//!
//! Wraps the rate store and the filter pipeline and owns the simulated clock:
//!
//! ```text
//!   Broker::next()
//!        │ fills since last step
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │ Market::advance()                            │
//! │   1. clock → next sample instant (or None)   │
//! │   2. view = rates @ new instant + accounts   │
//! │   3. for filter in filters (in order):       │
//! │        filter.apply(fills, view)             │
//! └──────────────────────┬───────────────────────┘
//!                        │ Step { time, orders, variable increments }
//!                        ▼
//!        Broker executes the orders through fill_order's path
//! ```
//!
//! Filters never mutate the ledger themselves; they hand orders back.

pub mod config;
pub mod error;
pub mod filter;
pub mod market;

pub use config::{ConfigError, FilterConfig, MarketConfig};
pub use error::{MarketError, Result};
pub use filter::{FeeModel, TransactionCostFilter, TurnoverFilter};
pub use market::{Market, MarketView, Step};

// Re-export the ports filters are written against
pub use tally_ports::{Filter, FilterOutput, LedgerView};
