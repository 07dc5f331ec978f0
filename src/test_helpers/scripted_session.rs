use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::booking::{BookingSession, SessionProvider};
use crate::config::Credentials;
use crate::error::{CollaboratorError, CollaboratorResult};

/// How a scripted collaborator step behaves
#[derive(Debug, Clone, PartialEq)]
pub enum StepBehavior {
    Succeed,
    Fail(CollaboratorError),
    /// Never resolves; the caller's timeout has to fire
    Hang,
    /// Panics with the given message, like a crashing browser driver
    Panic(String),
}

impl StepBehavior {
    async fn perform(&self) -> CollaboratorResult<()> {
        match self {
            Self::Succeed => Ok(()),
            Self::Fail(e) => Err(e.clone()),
            Self::Hang => std::future::pending().await,
            Self::Panic(message) => panic!("{message}"),
        }
    }
}

/// What one session does at each step of the checkout flow
#[derive(Debug, Clone, PartialEq)]
pub struct SessionScript {
    pub navigate: StepBehavior,
    pub checkout: StepBehavior,
    pub login_prompt: StepBehavior,
    pub submit: StepBehavior,
    pub confirmation: StepBehavior,
    pub banner: Option<String>,
    pub banner_read: StepBehavior,
    pub release: StepBehavior,
}

impl SessionScript {
    /// Already signed in, the site confirms the booking
    pub fn confirming() -> Self {
        Self {
            navigate: StepBehavior::Succeed,
            checkout: StepBehavior::Succeed,
            login_prompt: StepBehavior::Hang,
            submit: StepBehavior::Succeed,
            confirmation: StepBehavior::Succeed,
            banner: None,
            banner_read: StepBehavior::Succeed,
            release: StepBehavior::Succeed,
        }
    }

    /// Checkout opens but no confirmation ever shows up
    pub fn unconfirmed() -> Self {
        Self {
            confirmation: StepBehavior::Hang,
            ..Self::confirming()
        }
    }

    pub fn with_banner(mut self, text: impl Into<String>) -> Self {
        self.banner = Some(text.into());
        self
    }
}

impl Default for SessionScript {
    fn default() -> Self {
        Self::confirming()
    }
}

/// Everything the scripted sessions were asked to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionJournal {
    pub acquired: usize,
    pub released: usize,
    pub navigated: Vec<String>,
    pub submitted_usernames: Vec<String>,
}

impl SessionJournal {
    /// Every acquired session was handed back
    pub fn balanced(&self) -> bool {
        self.acquired == self.released
    }
}

/// Hands out [`ScriptedSession`]s. The script is picked per booking handle
/// on `navigate`, falling back to the default script.
#[derive(Debug, Clone)]
pub struct ScriptedSessionProvider {
    default_script: SessionScript,
    per_handle: Arc<HashMap<String, SessionScript>>,
    fail_acquire: bool,
    journal: Arc<Mutex<SessionJournal>>,
}

impl ScriptedSessionProvider {
    pub fn new(default_script: SessionScript) -> Self {
        Self {
            default_script,
            per_handle: Arc::new(HashMap::new()),
            fail_acquire: false,
            journal: Arc::new(Mutex::new(SessionJournal::default())),
        }
    }

    pub fn with_handle_script(mut self, handle: impl Into<String>, script: SessionScript) -> Self {
        Arc::make_mut(&mut self.per_handle).insert(handle.into(), script);
        self
    }

    /// Every `acquire` fails as if the browser could not start
    pub fn failing_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    pub fn journal(&self) -> SessionJournal {
        self.journal.lock().clone()
    }
}

#[async_trait]
impl SessionProvider for ScriptedSessionProvider {
    type Session = ScriptedSession;

    async fn acquire(&self) -> CollaboratorResult<Self::Session> {
        if self.fail_acquire {
            return Err(CollaboratorError::Unavailable(
                "scripted browser refused to start".to_string(),
            ));
        }
        self.journal.lock().acquired += 1;
        Ok(ScriptedSession {
            script: self.default_script.clone(),
            per_handle: Arc::clone(&self.per_handle),
            journal: Arc::clone(&self.journal),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedSession {
    script: SessionScript,
    per_handle: Arc<HashMap<String, SessionScript>>,
    journal: Arc<Mutex<SessionJournal>>,
}

#[async_trait]
impl BookingSession for ScriptedSession {
    async fn navigate(&mut self, booking_handle: &str) -> CollaboratorResult<()> {
        self.journal.lock().navigated.push(booking_handle.to_string());
        if let Some(script) = self.per_handle.get(booking_handle) {
            self.script = script.clone();
        }
        self.script.navigate.perform().await
    }

    async fn begin_checkout(&mut self) -> CollaboratorResult<()> {
        self.script.checkout.perform().await
    }

    async fn wait_for_login_prompt(&mut self) -> CollaboratorResult<()> {
        self.script.login_prompt.perform().await
    }

    async fn submit_credentials(&mut self, credentials: &Credentials) -> CollaboratorResult<()> {
        self.journal
            .lock()
            .submitted_usernames
            .push(credentials.username.clone());
        self.script.submit.perform().await
    }

    async fn wait_for_confirmation(&mut self) -> CollaboratorResult<()> {
        self.script.confirmation.perform().await
    }

    async fn banner_text(&mut self) -> CollaboratorResult<Option<String>> {
        self.script.banner_read.perform().await?;
        Ok(self.script.banner.clone())
    }

    async fn release(&mut self) -> CollaboratorResult<()> {
        self.journal.lock().released += 1;
        self.script.release.perform().await
    }
}
