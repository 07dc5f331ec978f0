use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{status, CANONICAL_TIMESTAMP_FORMAT};
use crate::error::TimestampError;

/// Accepted when an operator omits the seconds
const SHORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Identity of one class occurrence: a naive local date and time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeslot(NaiveDateTime);

impl Timeslot {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    pub fn at(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for Timeslot {
    fn from(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl fmt::Display for Timeslot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timeslot {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDateTime::parse_from_str(trimmed, CANONICAL_TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, SHORT_TIMESTAMP_FORMAT))
            .map(Self)
            .map_err(|e| TimestampError::invalid(trimmed, e))
    }
}

impl TryFrom<String> for Timeslot {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeslot> for String {
    fn from(value: Timeslot) -> Self {
        value.to_string()
    }
}

/// Booking status of a ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Still wanted, eligible for attempts
    Wanted,
    /// Held on the remote site
    Booked,
    /// On the remote waitlist; terminal for the ledger
    Waitlisted,
}

impl SlotStatus {
    /// Settled records never re-enter the wishlist
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Booked | Self::Waitlisted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wanted => status::WANTED,
            Self::Booked => status::BOOKED,
            Self::Waitlisted => status::WAITLISTED,
        }
    }
}

impl Default for SlotStatus {
    fn default() -> Self {
        Self::Wanted
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            status::WANTED => Ok(Self::Wanted),
            status::BOOKED => Ok(Self::Booked),
            status::WAITLISTED => Ok(Self::Waitlisted),
            other => Err(format!("Invalid slot status: {other}")),
        }
    }
}

/// One ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeslotRecord {
    pub timestamp: Timeslot,
    pub status: SlotStatus,
}

impl TimeslotRecord {
    pub fn new(timestamp: Timeslot, status: SlotStatus) -> Self {
        Self { timestamp, status }
    }

    pub fn wanted(timestamp: Timeslot) -> Self {
        Self::new(timestamp, SlotStatus::Wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeslot_canonical_round_trip() {
        let slot: Timeslot = "2024-03-21 11:30:00".parse().unwrap();
        assert_eq!(slot.to_string(), "2024-03-21 11:30:00");

        let short: Timeslot = " 2024-03-21 11:30 ".parse().unwrap();
        assert_eq!(short, slot);

        assert!("21/03/2024 11:30".parse::<Timeslot>().is_err());
    }

    #[test]
    fn test_status_parsing_is_lenient_about_case_and_whitespace() {
        assert_eq!(" Booked ".parse::<SlotStatus>().unwrap(), SlotStatus::Booked);
        assert_eq!("WAITLISTED".parse::<SlotStatus>().unwrap(), SlotStatus::Waitlisted);
        assert_eq!("wanted".parse::<SlotStatus>().unwrap(), SlotStatus::Wanted);
        assert!("cancelled".parse::<SlotStatus>().is_err());
    }

    #[test]
    fn test_settled_statuses() {
        assert!(SlotStatus::Booked.is_settled());
        assert!(SlotStatus::Waitlisted.is_settled());
        assert!(!SlotStatus::Wanted.is_settled());
    }

    #[test]
    fn test_record_serde() {
        let record = TimeslotRecord::wanted("2024-03-21 11:30:00".parse().unwrap());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"timestamp":"2024-03-21 11:30:00","status":"wanted"}"#);

        let parsed: TimeslotRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
