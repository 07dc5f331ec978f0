// Test Helpers Module - Scripted Collaborators
//
// In-memory stand-ins for the browser-side collaborators plus throwaway
// ledgers. Shared by unit tests, the integration suites under tests/ and the
// benches, so every scenario drives the real reconciliation code.

pub mod ledger_fixture;
pub mod scripted_prober;
pub mod scripted_session;

pub use ledger_fixture::TempLedger;
pub use scripted_prober::{ProbeStep, ScriptedProber};
pub use scripted_session::{
    ScriptedSession, ScriptedSessionProvider, SessionJournal, SessionScript, StepBehavior,
};
