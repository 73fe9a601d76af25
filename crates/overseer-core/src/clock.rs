//! Time source for claim ids, ticket ordering and receipt timestamps.
//!
//! The in-memory ticket lock orders tickets by [`Clock::now`], so tests swap
//! in a fixed or stepping clock to control queue order.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
