//! Wall clock used to stamp submissions

use chrono::{Duration, Local, NaiveDateTime};
use parking_lot::Mutex;

/// Source of the local submission time
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current local date-time
    fn now(&self) -> NaiveDateTime;
}

/// Process-local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    /// Start at the given instant
    #[must_use]
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
