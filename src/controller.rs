//! # Retry Controller
//!
//! Repeats select → probe → match → attempt → reconcile cycles until a
//! booking lands, the wishlist empties, the time budget runs out or a
//! shutdown is requested. Attempts within a cycle run one after another;
//! the only intentional delay is the backoff between cycles.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{timeout, Instant};
use uuid::Uuid;

use crate::booking::{AttemptReport, BookingAttemptStateMachine, SessionProvider};
use crate::clock::Clock;
use crate::config::BookerConfig;
use crate::constants::defaults;
use crate::ledger::{Ledger, Timeslot};
use crate::matcher::match_available;
use crate::probe::{AvailabilityProber, AvailableSlot};
use crate::reconciler::{OutcomeReconciler, Reconciliation};
use crate::wishlist::WishlistSelector;

/// Budget and pacing of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wall time after which no new cycle starts. A cycle already under way
    /// runs to completion, so a run can overshoot by one cycle.
    pub time_budget: Duration,
    /// Pause between cycles that made no booking
    pub backoff: Duration,
    /// Upper bound on one availability probe
    pub probe_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(defaults::TIME_BUDGET_SECONDS),
            backoff: Duration::from_secs(defaults::BACKOFF_SECONDS),
            probe_timeout: Duration::from_secs(defaults::PROBE_TIMEOUT_SECONDS),
        }
    }
}

/// How a run ended. Every variant is a clean exit for the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// At least one attempt in the final cycle confirmed or waitlisted
    Booked { timestamps: Vec<Timeslot> },
    /// The time budget ran out
    Exhausted,
    /// The wishlist emptied after the run had started
    WishlistExhausted,
    /// Shutdown was requested
    Cancelled,
    /// The wishlist was empty from the start
    NothingToDo,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Booked { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Booked { .. } => "booked",
            Self::Exhausted => "exhausted",
            Self::WishlistExhausted => "wishlist_exhausted",
            Self::Cancelled => "cancelled",
            Self::NothingToDo => "nothing_to_do",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    pub cycles: u32,
    pub attempts: Vec<AttemptReport>,
    /// Reconciliation failures, one entry per failed write
    pub ledger_errors: Vec<String>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn nothing_to_do() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            outcome: RunOutcome::NothingToDo,
            cycles: 0,
            attempts: Vec::new(),
            ledger_errors: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Sender side flips to `true` to request shutdown
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Budgets too large to add to `started` never expire
fn run_deadline(started: Instant, budget: Duration) -> Instant {
    started
        .checked_add(budget)
        .unwrap_or_else(|| started + Duration::from_secs(FAR_FUTURE_SECONDS))
}

/// About thirty years, the same horizon tokio uses for an unbounded sleep
const FAR_FUTURE_SECONDS: u64 = 86_400 * 365 * 30;

/// Resolves once shutdown is requested; never if the sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

enum CycleOutcome {
    Booked(Vec<Timeslot>),
    NoProgress,
    WishlistEmpty,
    Cancelled,
}

#[derive(Default)]
struct RunLog {
    attempts: Vec<AttemptReport>,
    ledger_errors: Vec<String>,
}

pub struct RetryController<S: SessionProvider> {
    schedule_url: String,
    policy: RetryPolicy,
    selector: WishlistSelector,
    attempts: BookingAttemptStateMachine,
    reconciler: OutcomeReconciler,
    ledger: Arc<dyn Ledger>,
    prober: Arc<dyn AvailabilityProber>,
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: SessionProvider> RetryController<S> {
    pub fn new(
        config: &BookerConfig,
        ledger: Arc<dyn Ledger>,
        prober: Arc<dyn AvailabilityProber>,
        sessions: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let credentials = Some(config.credentials.clone()).filter(|c| !c.username.is_empty());
        Self {
            schedule_url: config.site.schedule_url.clone(),
            policy: config.retry.to_policy(),
            selector: WishlistSelector::new(config.window.to_window()),
            attempts: BookingAttemptStateMachine::new(config.attempt.to_timeouts(), credentials),
            reconciler: OutcomeReconciler::new(Arc::clone(&ledger)),
            ledger,
            prober,
            sessions,
            clock,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_attempt_machine(mut self, attempts: BookingAttemptStateMachine) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> RunReport {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let deadline = run_deadline(started, self.policy.time_budget);
        let mut log = RunLog::default();
        let mut cycles: u32 = 0;

        crate::log_booking!(info, "RUN_STARTED",
            run_id: run_id,
            schedule_url: self.schedule_url.as_str(),
            time_budget_secs: self.policy.time_budget.as_secs(),
            backoff_secs: self.policy.backoff.as_secs(),
        );

        let outcome = loop {
            if *shutdown.borrow() {
                break RunOutcome::Cancelled;
            }
            if cycles > 0 && Instant::now() >= deadline {
                break RunOutcome::Exhausted;
            }
            cycles += 1;

            match self.cycle(run_id, cycles, &shutdown, &mut log).await {
                CycleOutcome::Booked(timestamps) => break RunOutcome::Booked { timestamps },
                CycleOutcome::WishlistEmpty if cycles == 1 => break RunOutcome::NothingToDo,
                CycleOutcome::WishlistEmpty => break RunOutcome::WishlistExhausted,
                CycleOutcome::Cancelled => break RunOutcome::Cancelled,
                CycleOutcome::NoProgress => {}
            }

            let now = Instant::now();
            if now >= deadline {
                break RunOutcome::Exhausted;
            }

            let pause = self.policy.backoff.min(deadline - now);
            crate::log_booking!(debug, "BACKOFF",
                run_id: run_id,
                cycle: cycles,
                pause_ms: pause.as_millis(),
            );
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown_requested(&mut shutdown) => break RunOutcome::Cancelled,
            }
        };

        let report = RunReport {
            run_id,
            outcome,
            cycles,
            attempts: log.attempts,
            ledger_errors: log.ledger_errors,
            elapsed: started.elapsed(),
        };

        crate::log_booking!(info, "RUN_FINISHED",
            run_id: run_id,
            outcome: report.outcome.label(),
            cycles: report.cycles,
            attempts: report.attempts.len(),
            ledger_errors: report.ledger_errors.len(),
            elapsed_ms: report.elapsed.as_millis(),
        );
        report
    }

    async fn cycle(
        &self,
        run_id: Uuid,
        cycle: u32,
        shutdown: &watch::Receiver<bool>,
        log: &mut RunLog,
    ) -> CycleOutcome {
        // Re-read every cycle: the previous one may have settled entries
        let wishlist = match self
            .selector
            .select_from(self.ledger.as_ref(), self.clock.as_ref())
        {
            Ok(wishlist) => wishlist,
            Err(e) => {
                crate::log_booking!(error, "WISHLIST_UNAVAILABLE",
                    run_id: run_id,
                    cycle: cycle,
                    error: e.to_string(),
                );
                log.ledger_errors.push(e.to_string());
                return CycleOutcome::NoProgress;
            }
        };
        if wishlist.is_empty() {
            crate::log_booking!(info, "WISHLIST_EMPTY", run_id: run_id, cycle: cycle);
            return CycleOutcome::WishlistEmpty;
        }

        let available = self.probe(run_id, cycle).await;
        let matches = match_available(&wishlist, &available);
        crate::log_booking!(info, "CYCLE_MATCHED",
            run_id: run_id,
            cycle: cycle,
            wanted: wishlist.len(),
            available: available.len(),
            matched: matches.len(),
        );

        let mut booked = Vec::new();
        let mut cancelled = false;
        for target in &matches {
            if *shutdown.borrow() {
                cancelled = true;
                break;
            }

            let report = self.attempts.run(self.sessions.as_ref(), target).await;
            match self.reconciler.reconcile(&report.timestamp, report.outcome) {
                Ok(Reconciliation::Skipped(outcome)) => {
                    crate::log_booking!(info, "SLOT_STILL_WANTED", attempt_id: report.attempt_id,
                        timeslot: report.timestamp.to_string(),
                        outcome: outcome,
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    crate::log_booking!(error, "RECONCILE_FAILED", attempt_id: report.attempt_id,
                        timeslot: report.timestamp.to_string(),
                        error: e.to_string(),
                    );
                    log.ledger_errors
                        .push(format!("{}: {}", report.timestamp, e));
                }
            }

            if report.outcome.is_booking_affecting() {
                booked.push(report.timestamp);
            }
            log.attempts.push(report);
        }

        if !booked.is_empty() {
            CycleOutcome::Booked(booked)
        } else if cancelled {
            CycleOutcome::Cancelled
        } else {
            CycleOutcome::NoProgress
        }
    }

    /// A failed or slow probe is an empty cycle
    async fn probe(&self, run_id: Uuid, cycle: u32) -> Vec<AvailableSlot> {
        match timeout(self.policy.probe_timeout, self.prober.probe(&self.schedule_url)).await {
            Ok(Ok(slots)) => slots,
            Ok(Err(e)) => {
                crate::log_booking!(warn, "PROBE_FAILED",
                    run_id: run_id,
                    cycle: cycle,
                    error: e.to_string(),
                );
                Vec::new()
            }
            Err(_) => {
                crate::log_booking!(warn, "PROBE_TIMEOUT",
                    run_id: run_id,
                    cycle: cycle,
                    waited_ms: self.policy.probe_timeout.as_millis(),
                );
                Vec::new()
            }
        }
    }
}
