//! # Outcome Reconciler
//!
//! Writes a finished attempt's outcome back into the ledger. Only
//! booking-affecting outcomes touch the ledger, and a record already holding
//! the target status is left alone.

use std::sync::Arc;

use crate::booking::BookingOutcome;
use crate::error::LedgerError;
use crate::ledger::{Ledger, LedgerResult, SlotStatus, Timeslot};

/// What reconciling one outcome did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Updated { from: SlotStatus, to: SlotStatus },
    AlreadyCurrent(SlotStatus),
    /// Outcome does not settle the timeslot
    Skipped(BookingOutcome),
}

impl Reconciliation {
    pub fn wrote(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

pub struct OutcomeReconciler {
    ledger: Arc<dyn Ledger>,
}

impl OutcomeReconciler {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// A missing record is surfaced as `NotFound`, never silently dropped
    pub fn reconcile(
        &self,
        timestamp: &Timeslot,
        outcome: BookingOutcome,
    ) -> LedgerResult<Reconciliation> {
        let Some(target) = outcome.ledger_status() else {
            crate::log_ledger!(debug, "RECONCILE_SKIPPED", timestamp: timestamp,
                outcome: outcome,
            );
            return Ok(Reconciliation::Skipped(outcome));
        };

        let current = self
            .ledger
            .get(timestamp)?
            .ok_or_else(|| LedgerError::not_found(timestamp))?;

        if current.status == target {
            crate::log_ledger!(debug, "RECONCILE_ALREADY_CURRENT", timestamp: timestamp,
                status: target,
            );
            return Ok(Reconciliation::AlreadyCurrent(target));
        }

        self.ledger.upsert_status(timestamp, target)?;
        crate::log_ledger!(info, "RECONCILED", timestamp: timestamp,
            outcome: outcome,
            from: current.status,
            to: target,
        );
        Ok(Reconciliation::Updated {
            from: current.status,
            to: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLedger;

    const SLOT: &str = "2024-03-21 11:30:00";

    fn fixture() -> (TempLedger, OutcomeReconciler) {
        let fixture = TempLedger::seeded(&[(SLOT, SlotStatus::Wanted)]).unwrap();
        let reconciler = OutcomeReconciler::new(fixture.ledger());
        (fixture, reconciler)
    }

    #[test]
    fn test_confirmed_books_the_slot() {
        let (fixture, reconciler) = fixture();
        let result = reconciler
            .reconcile(&SLOT.parse().unwrap(), BookingOutcome::Confirmed)
            .unwrap();

        assert_eq!(
            result,
            Reconciliation::Updated {
                from: SlotStatus::Wanted,
                to: SlotStatus::Booked
            }
        );
        assert_eq!(fixture.contents(), "2024-03-21 11:30:00,booked\n");
    }

    #[test]
    fn test_second_reconcile_does_not_write() {
        let (fixture, reconciler) = fixture();
        let ts: Timeslot = SLOT.parse().unwrap();
        reconciler.reconcile(&ts, BookingOutcome::Waitlisted).unwrap();
        let after_first = fixture.contents();

        let again = reconciler.reconcile(&ts, BookingOutcome::Waitlisted).unwrap();
        assert_eq!(again, Reconciliation::AlreadyCurrent(SlotStatus::Waitlisted));
        assert!(!again.wrote());
        assert_eq!(fixture.contents(), after_first);
    }

    #[test]
    fn test_unknown_and_rejected_leave_ledger_alone() {
        let (fixture, reconciler) = fixture();
        let ts: Timeslot = SLOT.parse().unwrap();
        let before = fixture.contents();

        for outcome in [BookingOutcome::Unknown, BookingOutcome::Rejected] {
            assert_eq!(
                reconciler.reconcile(&ts, outcome).unwrap(),
                Reconciliation::Skipped(outcome)
            );
        }
        assert_eq!(fixture.contents(), before);
        assert_eq!(fixture.status_of(SLOT), Some(SlotStatus::Wanted));
    }

    #[test]
    fn test_missing_record_is_surfaced() {
        let (_fixture, reconciler) = fixture();
        let err = reconciler
            .reconcile(&"2024-03-22 09:00:00".parse().unwrap(), BookingOutcome::Confirmed)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }
}
