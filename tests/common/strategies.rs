#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use proptest::strategy::Just;

use slot_booker::ledger::{SlotStatus, Timeslot, TimeslotRecord};
use slot_booker::probe::AvailableSlot;

/// Strategy for generating slot times on a half-hour grid over two weeks
pub fn timeslot_strategy() -> impl Strategy<Value = Timeslot> {
    (0i64..14, 12i64..44).prop_map(|(day, half_hour)| {
        let base: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 3, 18)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid base date");
        Timeslot::new(base + Duration::days(day) + Duration::minutes(half_hour * 30))
    })
}

pub fn status_strategy() -> impl Strategy<Value = SlotStatus> {
    prop_oneof![
        Just(SlotStatus::Wanted),
        Just(SlotStatus::Booked),
        Just(SlotStatus::Waitlisted),
    ]
}

/// Ledger contents with unique timestamps, as `bulk_insert` would build them
pub fn ledger_records_strategy() -> impl Strategy<Value = Vec<TimeslotRecord>> {
    prop::collection::btree_map(timeslot_strategy(), status_strategy(), 0..24).prop_map(|map| {
        map.into_iter()
            .map(|(timestamp, status)| TimeslotRecord::new(timestamp, status))
            .collect()
    })
}

/// Timestamps with likely repeats
pub fn timestamps_strategy() -> impl Strategy<Value = Vec<Timeslot>> {
    prop::collection::vec(timeslot_strategy(), 0..32)
}

pub fn available_slots_strategy() -> impl Strategy<Value = Vec<AvailableSlot>> {
    prop::collection::vec(timeslot_strategy(), 0..16).prop_map(|timestamps| {
        timestamps
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| {
                AvailableSlot::new(timestamp, format!("https://book.example.com/{i}"), "Sign up")
            })
            .collect()
    })
}

/// Arbitrary surrounding text for banner precedence checks
pub fn banner_filler_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z ,.!]{0,40}"
}

/// Fixed "now" anywhere inside the generated range
pub fn now_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (0i64..14, 0i64..(24 * 60)).prop_map(|(day, minute)| {
        NaiveDate::from_ymd_opt(2024, 3, 18)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid base date")
            + Duration::days(day)
            + Duration::minutes(minute)
    })
}
