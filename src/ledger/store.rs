use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::record::{SlotStatus, Timeslot, TimeslotRecord};
use crate::constants::LEGACY_LEDGER_HEADERS;
use crate::error::LedgerError;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Durable mapping from timeslot to booking status
pub trait Ledger: Send + Sync {
    /// All records in ledger order
    fn load(&self) -> LedgerResult<Vec<TimeslotRecord>>;

    /// Set the status of an existing record; fails with `NotFound` otherwise
    fn upsert_status(&self, timestamp: &Timeslot, status: SlotStatus) -> LedgerResult<()>;

    /// Append timestamps not already present, returning how many were added
    fn bulk_insert(&self, timestamps: &[Timeslot], status: SlotStatus) -> LedgerResult<usize>;

    fn get(&self, timestamp: &Timeslot) -> LedgerResult<Option<TimeslotRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|record| &record.timestamp == timestamp))
    }
}

/// Two-column, header-less text ledger rewritten atomically on every mutation
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> LedgerResult<Vec<TimeslotRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_ledger(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, sync it, then rename over the ledger
    fn write_records(&self, records: &[TimeslotRecord]) -> LedgerResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(render_ledger(records).as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| LedgerError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl Ledger for FileLedger {
    fn load(&self) -> LedgerResult<Vec<TimeslotRecord>> {
        self.read_records()
    }

    fn upsert_status(&self, timestamp: &Timeslot, status: SlotStatus) -> LedgerResult<()> {
        let _guard = self.write_lock.lock();
        let mut records = self.read_records()?;

        let record = records
            .iter_mut()
            .find(|record| &record.timestamp == timestamp)
            .ok_or_else(|| LedgerError::not_found(timestamp))?;
        let previous = record.status;
        record.status = status;

        self.write_records(&records)?;
        crate::log_ledger!(debug, "STATUS_UPDATED", timestamp: timestamp,
            from: previous,
            to: status,
        );
        Ok(())
    }

    fn bulk_insert(&self, timestamps: &[Timeslot], status: SlotStatus) -> LedgerResult<usize> {
        let _guard = self.write_lock.lock();
        let mut records = self.read_records()?;
        let mut seen: HashSet<Timeslot> = records.iter().map(|r| r.timestamp).collect();

        let before = records.len();
        for timestamp in timestamps {
            if seen.insert(*timestamp) {
                records.push(TimeslotRecord::new(*timestamp, status));
            }
        }
        let inserted = records.len() - before;

        if inserted > 0 {
            self.write_records(&records)?;
        }
        crate::log_ledger!(info, "BULK_INSERT",
            requested: timestamps.len(),
            inserted: inserted,
            status: status,
        );
        Ok(inserted)
    }
}

fn is_legacy_header(line: &str) -> bool {
    let normalized: String = line
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    LEGACY_LEDGER_HEADERS.contains(&normalized.as_str())
}

/// Parse ledger text, 1-based line numbers in errors
pub fn parse_ledger(text: &str) -> LedgerResult<Vec<TimeslotRecord>> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut first_content_line = true;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if first_content_line {
            first_content_line = false;
            if is_legacy_header(line) {
                continue;
            }
        }

        let (timestamp, status) = line
            .split_once(',')
            .ok_or_else(|| LedgerError::corrupt(line_no, "expected 'timestamp,status'"))?;
        let timestamp: Timeslot = timestamp
            .trim_matches(|c: char| c == '"' || c.is_whitespace())
            .parse()
            .map_err(|e: crate::error::TimestampError| LedgerError::corrupt(line_no, e.to_string()))?;
        let status: SlotStatus = status
            .trim_matches(|c: char| c == '"' || c.is_whitespace())
            .parse()
            .map_err(|e: String| LedgerError::corrupt(line_no, e))?;

        if !seen.insert(timestamp) {
            return Err(LedgerError::corrupt(
                line_no,
                format!("duplicate timestamp {timestamp}"),
            ));
        }
        records.push(TimeslotRecord::new(timestamp, status));
    }

    Ok(records)
}

pub fn render_ledger(records: &[TimeslotRecord]) -> String {
    records
        .iter()
        .map(|r| format!("{},{}\n", r.timestamp, r.status))
        .collect()
}
