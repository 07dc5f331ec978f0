//! Fixtures for driving the retry controller end to end against scripted
//! collaborators, a temporary ledger and a pinned clock.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;

use slot_booker::booking::{AttemptTimeouts, BookingAttemptStateMachine};
use slot_booker::clock::FixedClock;
use slot_booker::config::{BookerConfig, ConfigManager};
use slot_booker::controller::{RetryController, RetryPolicy};
use slot_booker::ledger::{SlotStatus, Timeslot};
use slot_booker::probe::AvailableSlot;
use slot_booker::test_helpers::{ScriptedProber, ScriptedSessionProvider, TempLedger};

/// Pinned "now": 6.5 hours before [`SLOT`]
pub const NOW: &str = "2024-03-21 05:00:00";
pub const SLOT: &str = "2024-03-21 11:30:00";
pub const LATER_SLOT: &str = "2024-03-22 18:00:00";
pub const SCHEDULE_URL: &str = "https://studio.example.com/schedule";

pub fn ts(text: &str) -> Timeslot {
    text.parse().expect("test timestamp")
}

pub fn at(text: &str) -> NaiveDateTime {
    ts(text).at()
}

pub fn handle_for(timestamp: &str) -> String {
    format!("https://book.example.com/checkout?slot={}", timestamp.replace(' ', "T"))
}

pub fn available(timestamp: &str) -> AvailableSlot {
    AvailableSlot::new(ts(timestamp), handle_for(timestamp), "Sign up now")
}

/// Millisecond-scale budget so exhaustion tests finish quickly
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        time_budget: Duration::from_millis(300),
        backoff: Duration::from_millis(20),
        probe_timeout: Duration::from_millis(50),
    }
}

pub fn fast_timeouts() -> AttemptTimeouts {
    AttemptTimeouts {
        checkout: Duration::from_millis(50),
        login_prompt: Duration::from_millis(10),
        confirmation: Duration::from_millis(30),
        banner: Duration::from_millis(20),
    }
}

/// Configuration pointing at `ledger`, with no credentials so no run waits
/// for a sign-in prompt
pub fn test_config(ledger: &TempLedger) -> BookerConfig {
    let document = format!(
        r#"
[site]
schedule_url = "{SCHEDULE_URL}"

[credentials]
username = ""
password = ""

[ledger]
path = "{}"
"#,
        ledger.ledger().path().display()
    );
    ConfigManager::from_toml_str(&document)
        .expect("test configuration")
        .config()
        .clone()
}

/// Everything one controller run touches, kept around for assertions
pub struct Harness {
    pub ledger: TempLedger,
    pub prober: Arc<ScriptedProber>,
    pub sessions: Arc<ScriptedSessionProvider>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new(
        rows: &[(&str, SlotStatus)],
        prober: ScriptedProber,
        sessions: ScriptedSessionProvider,
    ) -> Self {
        Self {
            ledger: TempLedger::seeded(rows).expect("seeded ledger"),
            prober: Arc::new(prober),
            sessions: Arc::new(sessions),
            clock: Arc::new(FixedClock::new(at(NOW))),
        }
    }

    pub fn config(&self) -> BookerConfig {
        test_config(&self.ledger)
    }

    pub fn controller(&self) -> RetryController<ScriptedSessionProvider> {
        self.controller_with(fast_policy())
    }

    pub fn controller_with(&self, policy: RetryPolicy) -> RetryController<ScriptedSessionProvider> {
        RetryController::new(
            &self.config(),
            self.ledger.ledger(),
            self.prober.clone(),
            self.sessions.clone(),
            self.clock.clone(),
        )
        .with_policy(policy)
        .with_attempt_machine(BookingAttemptStateMachine::new(fast_timeouts(), None))
    }
}
