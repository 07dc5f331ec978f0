use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::probe::{AvailabilityProber, AvailableSlot};

/// One scripted probe cycle
#[derive(Debug, Clone)]
pub enum ProbeStep {
    Slots(Vec<AvailableSlot>),
    Fail(CollaboratorError),
    Hang,
}

/// Replays queued probe cycles, then keeps returning the fallback slots
#[derive(Debug, Default)]
pub struct ScriptedProber {
    steps: Mutex<VecDeque<ProbeStep>>,
    fallback: Vec<AvailableSlot>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedProber {
    /// Always advertises `fallback`
    pub fn new(fallback: Vec<AvailableSlot>) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    /// Never advertises anything
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn then(self, step: ProbeStep) -> Self {
        self.steps.lock().push_back(step);
        self
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().len()
    }

    pub fn probed_urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl AvailabilityProber for ScriptedProber {
    async fn probe(&self, url: &str) -> CollaboratorResult<Vec<AvailableSlot>> {
        self.urls.lock().push(url.to_string());
        let step = self.steps.lock().pop_front();
        match step {
            Some(ProbeStep::Slots(slots)) => Ok(slots),
            Some(ProbeStep::Fail(e)) => Err(e),
            Some(ProbeStep::Hang) => std::future::pending().await,
            None => Ok(self.fallback.clone()),
        }
    }
}
