//! # Booking Attempts
//!
//! One attempt per matched slot: states, the events that move between them,
//! the banner classifier for unconfirmed outcomes, the collaborator session
//! boundary and the driver that ties them together.

pub mod attempt;
pub mod classifier;
pub mod events;
pub mod session;
pub mod states;

pub use attempt::{AttemptReport, AttemptTimeouts, BookingAttemptStateMachine, TransitionRecord};
pub use classifier::{BannerClassification, BannerClassifier};
pub use events::{determine_target_state, AttemptEvent};
pub use session::{BookingSession, SessionProvider};
pub use states::{AttemptState, BookingOutcome};
