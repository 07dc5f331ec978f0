use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::SlotStatus;

/// States of a single booking attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    /// Navigating to the slot's booking handle and starting checkout
    Initiated,
    /// Checkout started, waiting for an optional sign-in prompt
    Authenticating,
    /// Waiting for the "booking complete" signal
    AwaitingConfirmation,
    /// The site confirmed the booking
    Confirmed,
    /// No confirmation arrived
    Rejected,
    /// Reading the site's banner to find out what happened
    ClassifyingOutcome,
    /// Banner says the slot (or a clashing session) is already held
    AlreadyBooked,
    /// Banner says the user is on the waitlist
    Waitlisted,
    /// No banner, or one nobody recognises
    Unclassified,
    /// No collaborator session could be acquired
    Aborted,
}

impl AttemptState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::AlreadyBooked | Self::Waitlisted | Self::Unclassified | Self::Aborted
        )
    }

    /// Outcome an attempt ending in this state reports
    pub fn outcome(&self) -> BookingOutcome {
        match self {
            Self::Confirmed | Self::AlreadyBooked => BookingOutcome::Confirmed,
            Self::Waitlisted => BookingOutcome::Waitlisted,
            Self::Unclassified => BookingOutcome::Unknown,
            Self::Aborted => BookingOutcome::Rejected,
            Self::Initiated
            | Self::Authenticating
            | Self::AwaitingConfirmation
            | Self::Rejected
            | Self::ClassifyingOutcome => BookingOutcome::Pending,
        }
    }
}

impl Default for AttemptState {
    fn default() -> Self {
        Self::Initiated
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initiated => "initiated",
            Self::Authenticating => "authenticating",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::ClassifyingOutcome => "classifying_outcome",
            Self::AlreadyBooked => "already_booked",
            Self::Waitlisted => "waitlisted",
            Self::Unclassified => "unclassified",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What one attempt achieved on the remote site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingOutcome {
    Pending,
    Confirmed,
    Waitlisted,
    /// The attempt never reached the site
    Rejected,
    Unknown,
}

impl BookingOutcome {
    /// Ledger status this outcome settles the timeslot into, if any
    pub fn ledger_status(&self) -> Option<SlotStatus> {
        match self {
            Self::Confirmed => Some(SlotStatus::Booked),
            Self::Waitlisted => Some(SlotStatus::Waitlisted),
            Self::Pending | Self::Rejected | Self::Unknown => None,
        }
    }

    /// Confirmed or waitlisted outcomes end the retry loop
    pub fn is_booking_affecting(&self) -> bool {
        self.ledger_status().is_some()
    }
}

impl fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Waitlisted => "waitlisted",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(AttemptState::Confirmed.is_terminal());
        assert!(AttemptState::AlreadyBooked.is_terminal());
        assert!(AttemptState::Waitlisted.is_terminal());
        assert!(AttemptState::Unclassified.is_terminal());
        assert!(AttemptState::Aborted.is_terminal());
        assert!(!AttemptState::Initiated.is_terminal());
        assert!(!AttemptState::Rejected.is_terminal());
        assert!(!AttemptState::ClassifyingOutcome.is_terminal());
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(AttemptState::AlreadyBooked.outcome(), BookingOutcome::Confirmed);
        assert_eq!(AttemptState::Waitlisted.outcome(), BookingOutcome::Waitlisted);
        assert_eq!(AttemptState::Unclassified.outcome(), BookingOutcome::Unknown);
        assert_eq!(AttemptState::Aborted.outcome(), BookingOutcome::Rejected);
        assert_eq!(AttemptState::AwaitingConfirmation.outcome(), BookingOutcome::Pending);
    }

    #[test]
    fn test_outcome_ledger_status() {
        assert_eq!(BookingOutcome::Confirmed.ledger_status(), Some(SlotStatus::Booked));
        assert_eq!(BookingOutcome::Waitlisted.ledger_status(), Some(SlotStatus::Waitlisted));
        assert_eq!(BookingOutcome::Unknown.ledger_status(), None);
        assert_eq!(BookingOutcome::Rejected.ledger_status(), None);
        assert!(!BookingOutcome::Pending.is_booking_affecting());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&AttemptState::ClassifyingOutcome).unwrap();
        assert_eq!(json, "\"classifying_outcome\"");
        assert_eq!(AttemptState::AwaitingConfirmation.to_string(), "awaiting_confirmation");
    }
}
