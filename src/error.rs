//! # Error Types
//!
//! One error enum per concern, wrapped by [`BookerError`] at the crate boundary.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigurationError;

/// Failures reading or mutating the booking ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no ledger record for timestamp {timestamp}")]
    NotFound { timestamp: String },

    #[error("corrupt ledger line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to replace ledger at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LedgerError {
    pub fn not_found(timestamp: impl ToString) -> Self {
        Self::NotFound {
            timestamp: timestamp.to_string(),
        }
    }

    pub fn corrupt(line: usize, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            line,
            reason: reason.into(),
        }
    }
}

/// Failures reported by (or while waiting on) the browser-side collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("{operation} did not complete within {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("collaborator panicked: {0}")]
    Panicked(String),
}

impl CollaboratorError {
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    /// Timeouts are classification signals, not failures.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Failures parsing canonical or vendor timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("invalid timestamp '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("booking handle '{handle}' carries no slot time")]
    MissingSlotInfo { handle: String },
}

impl TimestampError {
    pub fn invalid(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}

/// Booking attempt state machine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("invalid attempt transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },
}

#[derive(Debug, Error)]
pub enum BookerError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("timestamp error: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("attempt error: {0}")]
    Attempt(#[from] AttemptError),
}

pub type Result<T> = std::result::Result<T, BookerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_recognised_as_classification_signal() {
        let err = CollaboratorError::timeout("confirmation", Duration::from_secs(30));
        assert!(err.is_timeout());
        assert!(!CollaboratorError::Navigation("404".into()).is_timeout());
        assert_eq!(
            err.to_string(),
            "confirmation did not complete within 30s"
        );
    }

    #[test]
    fn ledger_errors_wrap_into_booker_error() {
        let err: BookerError = LedgerError::not_found("2024-03-21 11:30:00").into();
        assert_eq!(
            err.to_string(),
            "ledger error: no ledger record for timestamp 2024-03-21 11:30:00"
        );
    }
}
