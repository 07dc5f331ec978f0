//! # Booking Attempt State Machine
//!
//! Drives one matched slot from `Initiated` to a terminal state:
//!
//! ```text
//! Initiated ──checkout──▶ Authenticating ──▶ AwaitingConfirmation ──▶ Confirmed
//!     │                                             │
//!     │ checkout aborted / timed out                │ no confirmation
//!     ▼                                             ▼
//! ClassifyingOutcome ◀────────────────────────── Rejected
//!     │
//!     ├─▶ AlreadyBooked   (outcome confirmed)
//!     ├─▶ Waitlisted      (outcome waitlisted)
//!     └─▶ Unclassified    (outcome unknown)
//! ```
//!
//! Every collaborator call is wrapped in a timeout. The session is released
//! on every path once it has been acquired, including when collaborator code
//! panics mid-flow; a caught panic ends the attempt as `Unclassified`.

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use uuid::Uuid;

use super::classifier::{BannerClassification, BannerClassifier};
use super::events::{determine_target_state, AttemptEvent};
use super::session::{BookingSession, SessionProvider};
use super::states::{AttemptState, BookingOutcome};
use crate::config::Credentials;
use crate::constants::defaults;
use crate::error::{AttemptError, CollaboratorError, CollaboratorResult};
use crate::ledger::Timeslot;
use crate::matcher::SlotMatch;

/// Upper bounds for each wait inside an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTimeouts {
    /// Session acquisition, navigation + checkout, and session release
    pub checkout: Duration,
    /// How long a sign-in form may take to appear (and to submit)
    pub login_prompt: Duration,
    /// How long to wait for the "booking complete" signal
    pub confirmation: Duration,
    /// How long reading the banner may take
    pub banner: Duration,
}

impl Default for AttemptTimeouts {
    fn default() -> Self {
        Self {
            checkout: Duration::from_secs(defaults::CHECKOUT_TIMEOUT_SECONDS),
            login_prompt: Duration::from_secs(defaults::LOGIN_PROMPT_TIMEOUT_SECONDS),
            confirmation: Duration::from_secs(defaults::CONFIRMATION_TIMEOUT_SECONDS),
            banner: Duration::from_secs(defaults::BANNER_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub from: AttemptState,
    pub to: AttemptState,
    pub event: &'static str,
}

/// Result of one attempt, read once by the reconciler
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub attempt_id: Uuid,
    pub timestamp: Timeslot,
    pub outcome: BookingOutcome,
    pub final_state: AttemptState,
    pub transitions: Vec<TransitionRecord>,
    pub banner: Option<String>,
    pub elapsed: Duration,
}

struct AttemptRun {
    attempt_id: Uuid,
    timestamp: Timeslot,
    state: AttemptState,
    transitions: Vec<TransitionRecord>,
    banner: Option<String>,
}

impl AttemptRun {
    fn new(timestamp: Timeslot) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            timestamp,
            state: AttemptState::default(),
            transitions: Vec::new(),
            banner: None,
        }
    }

    fn apply(&mut self, event: AttemptEvent) -> Result<AttemptState, AttemptError> {
        let target = determine_target_state(self.state, &event)?;
        crate::log_booking!(debug, "TRANSITION", attempt_id: self.attempt_id,
            from: self.state,
            to: target,
            event: event.event_type(),
            reason: event.reason(),
        );
        self.transitions.push(TransitionRecord {
            from: self.state,
            to: target,
            event: event.event_type(),
        });
        self.state = target;
        Ok(target)
    }

    fn finish(self, started: Instant) -> AttemptReport {
        AttemptReport {
            attempt_id: self.attempt_id,
            timestamp: self.timestamp,
            outcome: self.state.outcome(),
            final_state: self.state,
            transitions: self.transitions,
            banner: self.banner,
            elapsed: started.elapsed(),
        }
    }
}

/// Await a collaborator future for at most `limit`
async fn bounded<T, F>(operation: &'static str, limit: Duration, fut: F) -> CollaboratorResult<T>
where
    F: Future<Output = CollaboratorResult<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::timeout(operation, limit)),
    }
}

/// Like [`bounded`], but a panic raised by the collaborator becomes an error
async fn guarded<T, F>(operation: &'static str, limit: Duration, fut: F) -> CollaboratorResult<T>
where
    F: Future<Output = CollaboratorResult<T>>,
{
    match AssertUnwindSafe(bounded(operation, limit, fut))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => Err(CollaboratorError::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub struct BookingAttemptStateMachine {
    timeouts: AttemptTimeouts,
    credentials: Option<Credentials>,
    classifier: BannerClassifier,
}

impl BookingAttemptStateMachine {
    /// `credentials` is `None` when sessions arrive pre-authenticated
    pub fn new(timeouts: AttemptTimeouts, credentials: Option<Credentials>) -> Self {
        Self {
            timeouts,
            credentials,
            classifier: BannerClassifier::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: BannerClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn timeouts(&self) -> AttemptTimeouts {
        self.timeouts
    }

    /// Run one attempt against `target`. Never fails: collaborator problems
    /// are folded into the outcome.
    pub async fn run<P>(&self, sessions: &P, target: &SlotMatch) -> AttemptReport
    where
        P: SessionProvider + ?Sized,
    {
        let started = Instant::now();
        let mut run = AttemptRun::new(target.timestamp);

        crate::log_booking!(info, "ATTEMPT_STARTED", attempt_id: run.attempt_id,
            timeslot: target.timestamp.to_string(),
            slot: target.slot.display_text.as_str(),
        );

        let mut session =
            match guarded("session_acquire", self.timeouts.checkout, sessions.acquire()).await {
                Ok(session) => session,
                Err(e) => {
                    crate::log_booking!(warn, "SESSION_UNAVAILABLE", attempt_id: run.attempt_id,
                        error: e.to_string(),
                    );
                    if run.apply(AttemptEvent::SessionUnavailable(e.to_string())).is_err() {
                        run.state = AttemptState::Aborted;
                    }
                    return self.report(run, started);
                }
            };

        let driven = AssertUnwindSafe(self.drive(&mut run, &mut session, target))
            .catch_unwind()
            .await;

        if let Err(e) = guarded("session_release", self.timeouts.checkout, session.release()).await {
            crate::log_booking!(warn, "SESSION_RELEASE_FAILED", attempt_id: run.attempt_id,
                error: e.to_string(),
            );
        }

        match driven {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                crate::log_booking!(error, "ATTEMPT_INVALID_TRANSITION", attempt_id: run.attempt_id,
                    error: e.to_string(),
                );
                run.state = AttemptState::Unclassified;
            }
            Err(panic) => {
                crate::log_booking!(error, "ATTEMPT_PANICKED", attempt_id: run.attempt_id,
                    state: run.state,
                    panic_msg: panic_message(panic.as_ref()),
                );
                run.state = AttemptState::Unclassified;
            }
        }

        self.report(run, started)
    }

    fn report(&self, run: AttemptRun, started: Instant) -> AttemptReport {
        let report = run.finish(started);
        if report.outcome.is_booking_affecting() {
            crate::log_booking!(info, "ATTEMPT_FINISHED", attempt_id: report.attempt_id,
                timeslot: report.timestamp.to_string(),
                outcome: report.outcome,
                final_state: report.final_state,
                elapsed_ms: report.elapsed.as_millis(),
            );
        } else {
            crate::log_booking!(warn, "ATTEMPT_FINISHED", attempt_id: report.attempt_id,
                timeslot: report.timestamp.to_string(),
                outcome: report.outcome,
                final_state: report.final_state,
                banner: report.banner.as_deref(),
                elapsed_ms: report.elapsed.as_millis(),
            );
        }
        report
    }

    async fn drive<S>(
        &self,
        run: &mut AttemptRun,
        session: &mut S,
        target: &SlotMatch,
    ) -> Result<AttemptState, AttemptError>
    where
        S: BookingSession + ?Sized,
    {
        let checkout = bounded("checkout", self.timeouts.checkout, async {
            session.navigate(&target.slot.booking_handle).await?;
            session.begin_checkout().await
        })
        .await;

        if let Err(e) = checkout {
            // The site often shows a banner instead of a checkout page
            run.apply(AttemptEvent::CheckoutAborted(e.to_string()))?;
            return self.classify(run, session).await;
        }
        run.apply(AttemptEvent::CheckoutStarted)?;

        self.authenticate(run, session).await;
        run.apply(AttemptEvent::AuthenticationSettled)?;

        match bounded(
            "confirmation",
            self.timeouts.confirmation,
            session.wait_for_confirmation(),
        )
        .await
        {
            Ok(()) => return run.apply(AttemptEvent::ConfirmationReceived),
            Err(e) => {
                run.apply(AttemptEvent::ConfirmationMissing(e.to_string()))?;
            }
        }

        run.apply(AttemptEvent::ClassificationStarted)?;
        self.classify(run, session).await
    }

    /// Absence of a login prompt means the session is already signed in
    async fn authenticate<S>(&self, run: &AttemptRun, session: &mut S)
    where
        S: BookingSession + ?Sized,
    {
        let Some(credentials) = &self.credentials else {
            return;
        };

        match bounded(
            "login_prompt",
            self.timeouts.login_prompt,
            session.wait_for_login_prompt(),
        )
        .await
        {
            Ok(()) => {
                match bounded(
                    "submit_credentials",
                    self.timeouts.login_prompt,
                    session.submit_credentials(credentials),
                )
                .await
                {
                    Ok(()) => {
                        crate::log_booking!(info, "AUTHENTICATED", attempt_id: run.attempt_id,
                            username: credentials.username.as_str(),
                        );
                    }
                    Err(e) => {
                        crate::log_booking!(warn, "AUTHENTICATION_FAILED", attempt_id: run.attempt_id,
                            error: e.to_string(),
                        );
                    }
                }
            }
            Err(e) if e.is_timeout() => {
                crate::log_booking!(debug, "LOGIN_PROMPT_ABSENT", attempt_id: run.attempt_id,
                    waited_ms: self.timeouts.login_prompt.as_millis(),
                );
            }
            Err(e) => {
                crate::log_booking!(warn, "AUTHENTICATION_FAILED", attempt_id: run.attempt_id,
                    error: e.to_string(),
                );
            }
        }
    }

    async fn classify<S>(
        &self,
        run: &mut AttemptRun,
        session: &mut S,
    ) -> Result<AttemptState, AttemptError>
    where
        S: BookingSession + ?Sized,
    {
        let banner = match bounded("banner", self.timeouts.banner, session.banner_text()).await {
            Ok(text) => text,
            Err(e) => {
                crate::log_booking!(debug, "BANNER_UNAVAILABLE", attempt_id: run.attempt_id,
                    error: e.to_string(),
                );
                None
            }
        };

        let kind = self.classifier.classify(banner.as_deref());
        if kind == BannerClassification::Unclassified {
            crate::log_booking!(warn, "UNCLASSIFIED_OUTCOME", attempt_id: run.attempt_id,
                timeslot: run.timestamp.to_string(),
                banner: banner.as_deref(),
            );
        }
        run.banner = banner;
        run.apply(AttemptEvent::BannerClassified(kind))
    }
}
