//! Tally Runner - Strategy Loop Driver
//!
//! Drives a broker through time on behalf of an allocation strategy:
//!
//! - **Observer**: Records NAV, rates versus the numeraire and filter variables each step
//! - **Strategy**: Produces target weights per account
//! - **Runner**: Replays to the start time, then rebalances on a fixed cadence
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐  target weights  ┌──────────────────────┐
//! │  AllocationStrategy  │ ───────────────► │    StrategyRunner    │
//! └──────────▲───────────┘                  └───┬──────────────┬───┘
//!            │ context                          │ orders       │ next()
//!            │                                  ▼              ▼
//! ┌──────────┴───────────┐   update()     ┌──────────────────────┐
//! │    BrokerObserver    │ ◄───────────── │        Broker        │
//! └──────────────────────┘                └──────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod strategy;

pub use config::RunnerConfig;
pub use error::{Result, RunnerError};
pub use observer::{BrokerObserver, ObservationKey};
pub use strategy::{AllocationContext, AllocationStrategy, FixedWeights, StrategyRunner, rebalance_orders};
