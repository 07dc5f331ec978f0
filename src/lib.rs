#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

//! # Slot Booker
//!
//! Booking reconciliation engine for claiming scarce, time-boxed class
//! reservations on a scheduling site that only exposes availability through
//! a rendered widget.
//!
//! ## Overview
//!
//! A durable ledger holds the timeslots an operator wants. Each run derives
//! the still-wanted slots inside a lookahead window, matches them against
//! what the site currently advertises, drives one booking attempt per match
//! to a terminal outcome and writes booking-affecting outcomes back into the
//! ledger. Cycles repeat until something is booked or the time budget runs
//! out.
//!
//! The browser that renders the vendor's page is an external collaborator.
//! The core only talks to it through [`probe::AvailabilityProber`] and
//! [`booking::SessionProvider`], and bounds every wait on it.
//!
//! ## Module Organization
//!
//! - [`ledger`] - Timeslot records and the atomically rewritten file ledger
//! - [`wishlist`] - Lookahead window and still-wanted selection
//! - [`probe`] - Available slots and vendor timestamp parsing
//! - [`matcher`] - Wishlist/availability intersection
//! - [`booking`] - Attempt states, events, banner classification, session boundary
//! - [`reconciler`] - Outcome to ledger status write-back
//! - [`controller`] - Bounded retry loop with shutdown support
//! - [`runner`] - Process-level run entry point
//! - [`config`] - Configuration loading and validation
//! - [`logging`] - Structured logging setup and macros
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use slot_booker::clock::SystemClock;
//! use slot_booker::config::ConfigManager;
//! use slot_booker::controller::shutdown_channel;
//! use slot_booker::ledger::FileLedger;
//! use slot_booker::runner::run_booking;
//! use slot_booker::test_helpers::{ScriptedProber, ScriptedSessionProvider, SessionScript};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(Some("config/slot-booker.toml".into()))?;
//! let config = manager.config();
//! let ledger = Arc::new(FileLedger::new(&config.ledger.path));
//! let (_shutdown_tx, shutdown_rx) = shutdown_channel();
//!
//! // Real deployments plug in browser-backed collaborators here
//! let report = run_booking(
//!     config,
//!     ledger,
//!     Arc::new(ScriptedProber::empty()),
//!     Arc::new(ScriptedSessionProvider::new(SessionScript::confirming())),
//!     Arc::new(SystemClock),
//!     shutdown_rx,
//! )
//! .await?;
//! println!("run finished: {}", report.outcome.label());
//! # Ok(())
//! # }
//! ```

pub mod booking;
pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod matcher;
pub mod probe;
pub mod reconciler;
pub mod runner;
pub mod test_helpers;
pub mod wishlist;

pub use booking::{
    AttemptReport, AttemptState, AttemptTimeouts, BannerClassification, BannerClassifier,
    BookingAttemptStateMachine, BookingOutcome, BookingSession, SessionProvider,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use crate::config::{BookerConfig, ConfigManager, Credentials};
pub use controller::{shutdown_channel, RetryController, RetryPolicy, RunOutcome, RunReport};
pub use error::{BookerError, Result};
pub use ledger::{FileLedger, Ledger, SlotStatus, Timeslot, TimeslotRecord};
pub use logging::{init_structured_logging, LogFormat};
pub use matcher::{match_available, SlotMatch};
pub use probe::{parse_vendor_timestamp, timestamp_from_handle, AvailabilityProber, AvailableSlot};
pub use reconciler::{OutcomeReconciler, Reconciliation};
pub use runner::run_booking;
pub use wishlist::{WishlistSelector, WishlistWindow};
