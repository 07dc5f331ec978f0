//! # Booking Ledger
//!
//! Durable record of the timeslots an operator wants and what happened to
//! them. The timestamp is the key: at most one record per timeslot. Records
//! are appended by seeding and updated by outcome reconciliation, never
//! deleted.

pub mod record;
pub mod store;

pub use record::{SlotStatus, Timeslot, TimeslotRecord};
pub use store::{parse_ledger, render_ledger, FileLedger, Ledger, LedgerResult};
