//! Tally Clock
//!
//! Simulated time for backtests. The clock does not follow wall time: it
//! jumps from one sample timestamp to the next, and only when asked.
//!
//! ```text
//! schedule:  t0 ── t1 ── t2 ── t3 ── (exhausted)
//!             ▲
//!           start
//! advance() → t1, advance() → t2, advance() → t3, advance() → None
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use tally_clock::{Clock, ReplayClock};
//!
//! let mut clock = ReplayClock::new(schedule, None).expect("non-empty schedule");
//! while let Some(t) = clock.advance() {
//!     assert_eq!(clock.now(), t);
//! }
//! ```

mod replay;

pub use replay::ReplayClock;

// Re-export the Clock trait for convenience
pub use tally_ports::Clock;
