//! Wait-loop tuning for ticket locks.

use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Polling parameters for a contended `acquire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Delay before the first re-check of the pending count.
    pub poll_interval: Duration,
    /// Ceiling the delay doubles toward while the resource stays contended.
    pub max_poll_interval: Duration,
}

impl LockConfig {
    /// Builds a config, clamping `poll_interval` to at least 1 ms and
    /// `max_poll_interval` to at least `poll_interval`.
    #[must_use]
    pub fn new(poll_interval: Duration, max_poll_interval: Duration) -> Self {
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        Self {
            poll_interval,
            max_poll_interval: max_poll_interval.max(poll_interval),
        }
    }

    /// Starts a fresh backoff sequence.
    #[must_use]
    pub fn backoff(&self) -> PollBackoff {
        PollBackoff {
            current: self.poll_interval,
            max: self.max_poll_interval,
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(25), Duration::from_secs(1))
    }
}

/// Doubling delay sequence capped at a maximum.
#[derive(Debug, Clone)]
pub struct PollBackoff {
    current: Duration,
    max: Duration,
}

impl PollBackoff {
    /// Returns the next delay and advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self
            .current
            .checked_mul(2)
            .map_or(self.max, |doubled| doubled.min(self.max));
        delay
    }
}
