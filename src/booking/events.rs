use serde::{Deserialize, Serialize};

use super::classifier::BannerClassification;
use super::states::AttemptState;
use crate::error::AttemptError;

/// Events that move a booking attempt between states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AttemptEvent {
    /// The checkout flow opened for the slot
    CheckoutStarted,
    /// Navigation or checkout did not complete (often a banner instead)
    CheckoutAborted(String),
    /// No collaborator session could be acquired
    SessionUnavailable(String),
    /// Sign-in handled, skipped or failed; confirmation may still arrive
    AuthenticationSettled,
    /// The site signalled "booking complete"
    ConfirmationReceived,
    /// The confirmation wait ended without a signal
    ConfirmationMissing(String),
    /// Start reading the banner
    ClassificationStarted,
    /// Banner read and classified
    BannerClassified(BannerClassification),
}

impl AttemptEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CheckoutStarted => "checkout_started",
            Self::CheckoutAborted(_) => "checkout_aborted",
            Self::SessionUnavailable(_) => "session_unavailable",
            Self::AuthenticationSettled => "authentication_settled",
            Self::ConfirmationReceived => "confirmation_received",
            Self::ConfirmationMissing(_) => "confirmation_missing",
            Self::ClassificationStarted => "classification_started",
            Self::BannerClassified(_) => "banner_classified",
        }
    }

    /// Reason text carried by failure-flavoured events
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::CheckoutAborted(reason)
            | Self::SessionUnavailable(reason)
            | Self::ConfirmationMissing(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Transition table for booking attempts
pub fn determine_target_state(
    current: AttemptState,
    event: &AttemptEvent,
) -> Result<AttemptState, AttemptError> {
    let target = match (current, event) {
        (AttemptState::Initiated, AttemptEvent::CheckoutStarted) => AttemptState::Authenticating,
        (AttemptState::Initiated, AttemptEvent::CheckoutAborted(_)) => {
            AttemptState::ClassifyingOutcome
        }
        (AttemptState::Initiated, AttemptEvent::SessionUnavailable(_)) => AttemptState::Aborted,

        (AttemptState::Authenticating, AttemptEvent::AuthenticationSettled) => {
            AttemptState::AwaitingConfirmation
        }

        (AttemptState::AwaitingConfirmation, AttemptEvent::ConfirmationReceived) => {
            AttemptState::Confirmed
        }
        (AttemptState::AwaitingConfirmation, AttemptEvent::ConfirmationMissing(_)) => {
            AttemptState::Rejected
        }

        (AttemptState::Rejected, AttemptEvent::ClassificationStarted) => {
            AttemptState::ClassifyingOutcome
        }

        (AttemptState::ClassifyingOutcome, AttemptEvent::BannerClassified(kind)) => match kind {
            BannerClassification::AlreadyBooked => AttemptState::AlreadyBooked,
            BannerClassification::Waitlisted => AttemptState::Waitlisted,
            BannerClassification::Unclassified => AttemptState::Unclassified,
        },

        (from, event) => {
            return Err(AttemptError::InvalidTransition {
                from: from.to_string(),
                event: event.event_type().to_string(),
            })
        }
    };

    Ok(target)
}
