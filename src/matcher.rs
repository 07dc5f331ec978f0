//! Intersects the wishlist with advertised availability by exact timestamp.

use std::collections::BTreeSet;

use crate::ledger::Timeslot;
use crate::probe::AvailableSlot;

/// A probed slot that is on the wishlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMatch {
    pub slot: AvailableSlot,
    pub timestamp: Timeslot,
}

/// Keep the available slots whose timestamp is wanted, in probe order.
/// No matches is a normal outcome.
pub fn match_available(wishlist: &BTreeSet<Timeslot>, available: &[AvailableSlot]) -> Vec<SlotMatch> {
    if wishlist.is_empty() {
        return Vec::new();
    }
    available
        .iter()
        .filter(|slot| wishlist.contains(&slot.timestamp))
        .map(|slot| SlotMatch {
            slot: slot.clone(),
            timestamp: slot.timestamp,
        })
        .collect()
}
