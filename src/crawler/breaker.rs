//! Trash-rate circuit breaker
//!
//! Watches the Trash partition's growth between consecutive observations.
//! A burst of trashed URLs larger than the configured limit within one
//! interval means the site (or the network path to it) is failing
//! wholesale, and the run should stop instead of burning the frontier.

/// Tracks Trash growth between stats intervals
pub struct CircuitBreaker {
    trash_limit: u64,
    last_trash: u64,
}

impl CircuitBreaker {
    /// Creates a breaker seeded with the current Trash count, so URLs
    /// trashed in earlier runs never count against this one.
    pub fn new(trash_limit: u64, initial_trash: u64) -> Self {
        Self {
            trash_limit,
            last_trash: initial_trash,
        }
    }

    /// Records the current Trash count and returns the interval's delta if
    /// it exceeded the limit
    ///
    /// Exceeding means strictly greater: a delta equal to the limit passes.
    pub fn observe(&mut self, trash_now: u64) -> Option<u64> {
        let delta = trash_now.saturating_sub(self.last_trash);
        self.last_trash = trash_now;

        if delta > self.trash_limit {
            Some(delta)
        } else {
            None
        }
    }

    pub fn limit(&self) -> u64 {
        self.trash_limit
    }
}
