//! Wall-clock source for wishlist window evaluation.
//!
//! Timeslots are naive local times in the studio's fixed zone, so the clock
//! hands out `NaiveDateTime` rather than an offset-aware instant.

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
