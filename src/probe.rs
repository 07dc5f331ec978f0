//! # Availability Probe Boundary
//!
//! The scheduling site exposes availability only through a rendered widget.
//! A browser-side collaborator implements [`AvailabilityProber`] and hands
//! back typed [`AvailableSlot`] records; this module owns the record type and
//! the parsing of the vendor's free-text slot times.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{HANDLE_SLOT_INFO_PARAM, VENDOR_TIMESTAMP_FORMAT};
use crate::error::{CollaboratorResult, TimestampError};
use crate::ledger::Timeslot;

/// A currently bookable slot from one probe cycle. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub timestamp: Timeslot,
    /// Opaque reference that starts the booking flow, usually a URL
    pub booking_handle: String,
    /// Button label, for logs only
    pub display_text: String,
}

impl AvailableSlot {
    pub fn new(
        timestamp: Timeslot,
        booking_handle: impl Into<String>,
        display_text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            booking_handle: booking_handle.into(),
            display_text: display_text.into(),
        }
    }

    /// Build a slot from a booking handle URL that carries its own slot time
    pub fn from_handle(
        booking_handle: impl Into<String>,
        display_text: impl Into<String>,
    ) -> Result<Self, TimestampError> {
        let booking_handle = booking_handle.into();
        let timestamp = timestamp_from_handle(&booking_handle)?;
        Ok(Self {
            timestamp,
            booking_handle,
            display_text: display_text.into(),
        })
    }
}

/// Supplies currently bookable slots. Finding nothing bookable within the
/// collaborator's own bounded wait is an empty result, not an error.
#[async_trait]
pub trait AvailabilityProber: Send + Sync {
    async fn probe(&self, url: &str) -> CollaboratorResult<Vec<AvailableSlot>>;
}

/// Parse the widget's slot label, e.g. `Thu. Mar 21, 2024 11:30 AM`
pub fn parse_vendor_timestamp(text: &str) -> Result<Timeslot, TimestampError> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, VENDOR_TIMESTAMP_FORMAT)
        .map(Timeslot::new)
        .map_err(|e| TimestampError::invalid(text, e))
}

/// Recover the slot time from the `item[info]` query parameter of a handle
pub fn timestamp_from_handle(handle: &str) -> Result<Timeslot, TimestampError> {
    let parsed = url::Url::parse(handle).map_err(|e| TimestampError::invalid(handle, e))?;
    let info = parsed
        .query_pairs()
        .find(|(key, _)| key == HANDLE_SLOT_INFO_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| TimestampError::MissingSlotInfo {
            handle: handle.to_string(),
        })?;
    parse_vendor_timestamp(&info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vendor_timestamp() {
        let slot = parse_vendor_timestamp("Thu. Mar 21, 2024 11:30 AM").unwrap();
        assert_eq!(slot.to_string(), "2024-03-21 11:30:00");

        let evening = parse_vendor_timestamp("Fri.  Mar 22, 2024   6:15 PM").unwrap();
        assert_eq!(evening.to_string(), "2024-03-22 18:15:00");
    }

    #[test]
    fn test_parse_vendor_timestamp_rejects_other_formats() {
        assert!(parse_vendor_timestamp("2024-03-21 11:30:00").is_err());
        assert!(parse_vendor_timestamp("").is_err());
    }

    #[test]
    fn test_timestamp_from_handle() {
        let handle = "https://cart.example.com/sites/112721/cart/add_booking?\
                      item%5Binfo%5D=Thu.+Mar+21%2C+2024+11%3A30+AM&item%5Bid%5D=42";
        let slot = AvailableSlot::from_handle(handle, "Sign up now").unwrap();
        assert_eq!(slot.timestamp.to_string(), "2024-03-21 11:30:00");
        assert_eq!(slot.booking_handle, handle);
        assert_eq!(slot.display_text, "Sign up now");
    }

    #[test]
    fn test_handle_without_slot_info() {
        let err = timestamp_from_handle("https://cart.example.com/add?item%5Bid%5D=42").unwrap_err();
        assert!(matches!(err, TimestampError::MissingSlotInfo { .. }));

        assert!(timestamp_from_handle("not a url").is_err());
    }
}
