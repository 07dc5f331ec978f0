//! # Wishlist Selection
//!
//! The wishlist is the part of the ledger that is worth attempting right
//! now: records that are not settled and whose time falls inside the
//! half-open lookahead window `[now + min_lead, midnight + max_lead_days + 1 day)`.

use chrono::{NaiveDateTime, TimeDelta};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::clock::Clock;
use crate::ledger::{Ledger, LedgerResult, Timeslot, TimeslotRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WishlistWindow {
    min_lead: Duration,
    max_lead_days: u32,
}

impl WishlistWindow {
    pub fn new(min_lead: Duration, max_lead_days: u32) -> Self {
        Self {
            min_lead,
            max_lead_days,
        }
    }

    pub fn min_lead(&self) -> Duration {
        self.min_lead
    }

    pub fn max_lead_days(&self) -> u32 {
        self.max_lead_days
    }

    /// Inclusive start and exclusive end of the window at `now`
    pub fn bounds(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let min_lead = TimeDelta::from_std(self.min_lead).unwrap_or(TimeDelta::MAX);
        let start = now.checked_add_signed(min_lead).unwrap_or(NaiveDateTime::MAX);

        let midnight = now.date().and_time(chrono::NaiveTime::MIN);
        let end = midnight
            .checked_add_signed(TimeDelta::days(i64::from(self.max_lead_days) + 1))
            .unwrap_or(NaiveDateTime::MAX);

        (start, end)
    }

    pub fn contains(&self, now: NaiveDateTime, at: NaiveDateTime) -> bool {
        let (start, end) = self.bounds(now);
        start <= at && at < end
    }
}

/// Derives the still-wanted timeslots from ledger records
#[derive(Debug, Clone, Copy)]
pub struct WishlistSelector {
    window: WishlistWindow,
}

impl WishlistSelector {
    pub fn new(window: WishlistWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> WishlistWindow {
        self.window
    }

    /// Unsettled records inside the window. Empty means "skip this run".
    pub fn select(&self, records: &[TimeslotRecord], now: NaiveDateTime) -> BTreeSet<Timeslot> {
        records
            .iter()
            .filter(|record| !record.status.is_settled())
            .filter(|record| self.window.contains(now, record.timestamp.at()))
            .map(|record| record.timestamp)
            .collect()
    }

    pub fn select_from<L, C>(&self, ledger: &L, clock: &C) -> LedgerResult<BTreeSet<Timeslot>>
    where
        L: Ledger + ?Sized,
        C: Clock + ?Sized,
    {
        let records = ledger.load()?;
        Ok(self.select(&records, clock.now()))
    }
}
