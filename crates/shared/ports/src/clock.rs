use tally_core::Timestamp;

/// Port for simulated time
///
/// Implementations must be monotone: `now()` never moves backward.
pub trait Clock {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
