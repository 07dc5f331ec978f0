//! Process-level entry point for one scheduled booking run.
//!
//! Embedding programs supply the browser-side collaborators; everything
//! else comes from the [`BookerConfig`]. Any [`RunOutcome`] is a clean
//! exit: failing to book on the remote site is not a process failure.

use std::sync::Arc;
use tokio::sync::watch;

use crate::booking::SessionProvider;
use crate::clock::Clock;
use crate::config::BookerConfig;
use crate::controller::{RetryController, RunOutcome, RunReport};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::probe::AvailabilityProber;
use crate::wishlist::WishlistSelector;

/// Load the ledger, skip the run when nothing is wanted, otherwise retry
/// until booked or out of budget. Only ledger read failures are errors.
pub async fn run_booking<S: SessionProvider>(
    config: &BookerConfig,
    ledger: Arc<dyn Ledger>,
    prober: Arc<dyn AvailabilityProber>,
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
    shutdown: watch::Receiver<bool>,
) -> Result<RunReport> {
    let records = ledger.load()?;
    let wishlist = WishlistSelector::new(config.window.to_window()).select(&records, clock.now());

    if wishlist.is_empty() {
        crate::log_booking!(info, "NOTHING_TO_DO",
            records: records.len(),
            min_lead_minutes: config.window.min_lead_minutes,
            max_lead_days: config.window.max_lead_days,
        );
        return Ok(RunReport::nothing_to_do());
    }

    crate::log_booking!(info, "WISHLIST_SELECTED",
        wanted: wishlist.len(),
        first: wishlist.iter().next().map(ToString::to_string),
    );

    let report = RetryController::new(config, ledger, prober, sessions, clock)
        .run(shutdown)
        .await;

    if let RunOutcome::Exhausted = report.outcome {
        crate::log_booking!(warn, "BUDGET_EXHAUSTED",
            run_id: report.run_id,
            cycles: report.cycles,
            attempts: report.attempts.len(),
        );
    }
    Ok(report)
}
