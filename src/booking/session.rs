//! # Booking Session Boundary
//!
//! The browser that renders the vendor's checkout is an external
//! collaborator. The attempt state machine only talks to it through these
//! traits and wraps every call in its own timeout, so implementations may
//! wait as long as they like without making the core unbounded.

use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::CollaboratorResult;

/// One acquired browser session, used by exactly one attempt
#[async_trait]
pub trait BookingSession: Send {
    /// Open the slot's booking handle
    async fn navigate(&mut self, booking_handle: &str) -> CollaboratorResult<()>;

    /// Click through to checkout
    async fn begin_checkout(&mut self) -> CollaboratorResult<()>;

    /// Resolve once a sign-in form is visible
    async fn wait_for_login_prompt(&mut self) -> CollaboratorResult<()>;

    async fn submit_credentials(&mut self, credentials: &Credentials) -> CollaboratorResult<()>;

    /// Resolve once the "booking complete" signal is visible
    async fn wait_for_confirmation(&mut self) -> CollaboratorResult<()>;

    /// Current message banner, `None` if the page shows none
    async fn banner_text(&mut self) -> CollaboratorResult<Option<String>>;

    /// Close the session; called exactly once on every path
    async fn release(&mut self) -> CollaboratorResult<()>;
}

/// Hands out fresh sessions, one per probe or attempt
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: BookingSession;

    async fn acquire(&self) -> CollaboratorResult<Self::Session>;
}
