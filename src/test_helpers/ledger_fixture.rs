use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use crate::ledger::{FileLedger, Ledger, LedgerResult, SlotStatus, Timeslot, TimeslotRecord};

/// A [`FileLedger`] in its own temporary directory, removed on drop
pub struct TempLedger {
    dir: TempDir,
    ledger: Arc<FileLedger>,
}

impl TempLedger {
    pub fn new() -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let ledger = Arc::new(FileLedger::new(dir.path().join("bookings.csv")));
        Ok(Self { dir, ledger })
    }

    /// Ledger pre-populated with `(canonical timestamp, status)` rows
    pub fn seeded(rows: &[(&str, SlotStatus)]) -> std::io::Result<Self> {
        let fixture = Self::new()?;
        let mut text = String::new();
        for (timestamp, status) in rows {
            text.push_str(&format!("{timestamp},{status}\n"));
        }
        fs::write(fixture.ledger.path(), text)?;
        Ok(fixture)
    }

    pub fn ledger(&self) -> Arc<FileLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Raw file contents, empty when nothing was written yet
    pub fn contents(&self) -> String {
        fs::read_to_string(self.ledger.path()).unwrap_or_default()
    }

    pub fn records(&self) -> LedgerResult<Vec<TimeslotRecord>> {
        self.ledger.load()
    }

    pub fn status_of(&self, timestamp: &str) -> Option<SlotStatus> {
        let timestamp: Timeslot = timestamp.parse().ok()?;
        self.ledger.get(&timestamp).ok().flatten().map(|r| r.status)
    }
}
