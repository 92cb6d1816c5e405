//! Tally Core Domain
//!
//! Pure domain types for the Tally ledger simulator.
//! This crate contains no I/O and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Account, AccountName, Fill, FillSource, FillStatus, Order, Posting, Variables};
pub use values::{Amount, Currency, CurrencyPair, Money, Rate, Timestamp};
