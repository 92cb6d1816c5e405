use log::debug;
use tally_core::Timestamp;
use tally_ports::Clock;

/// Monotone clock that steps through a fixed schedule of instants
pub struct ReplayClock {
    /// Sorted, de-duplicated instants the clock may move to
    schedule: Vec<Timestamp>,
    /// Index of the first schedule entry strictly after `current`
    cursor: usize,
    current: Timestamp,
}

impl ReplayClock {
    /// Create a clock over `schedule`
    ///
    /// # Arguments
    /// * `schedule` - Instants in any order; duplicates are ignored
    /// * `start` - Initial time. If None, the earliest scheduled instant.
    ///
    /// Returns None when there is neither a start time nor any instant.
    pub fn new(schedule: impl IntoIterator<Item = Timestamp>, start: Option<Timestamp>) -> Option<Self> {
        let mut schedule: Vec<Timestamp> = schedule.into_iter().collect();
        schedule.sort();
        schedule.dedup();

        let current = match start {
            Some(t) => t,
            None => *schedule.first()?,
        };
        let cursor = schedule.partition_point(|t| *t <= current);

        Some(Self {
            schedule,
            cursor,
            current,
        })
    }

    /// Move to the next scheduled instant strictly after the current one
    ///
    /// Returns None, leaving the clock untouched, once the schedule is exhausted.
    pub fn advance(&mut self) -> Option<Timestamp> {
        let next = *self.schedule.get(self.cursor)?;
        self.cursor += 1;
        self.current = next;
        debug!("Clock advanced to {}", next);
        Some(next)
    }

    /// The instant `advance()` would move to
    pub fn peek_next(&self) -> Option<Timestamp> {
        self.schedule.get(self.cursor).copied()
    }

    /// Number of steps left before exhaustion
    pub fn remaining(&self) -> usize {
        self.schedule.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> Timestamp {
        self.current
    }

    fn name(&self) -> &str {
        "ReplayClock"
    }
}
