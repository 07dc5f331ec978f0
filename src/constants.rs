//! # System Constants
//!
//! Canonical formats, ledger vocabulary, banner patterns and the default
//! windows and timeouts that the configuration falls back to.

/// Canonical ledger timestamp format (`2024-03-21 11:30:00`).
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format the scheduling widget renders (`Thu. Mar 21, 2024 11:30 AM`).
pub const VENDOR_TIMESTAMP_FORMAT: &str = "%a. %b %d, %Y %I:%M %p";

/// Query parameter of a booking handle that carries the slot time.
pub const HANDLE_SLOT_INFO_PARAM: &str = "item[info]";

/// Ledger status vocabulary as persisted on disk.
pub mod status {
    pub const WANTED: &str = "wanted";
    pub const BOOKED: &str = "booked";
    pub const WAITLISTED: &str = "waitlisted";
}

/// Header rows older seeding tools wrote at the top of the ledger.
pub const LEGACY_LEDGER_HEADERS: &[&str] = &["datetime,status", "timestamp,status"];

/// Banner text patterns, checked in order.
pub mod banners {
    /// The slot (or a conflicting session) is already held.
    pub const ALREADY_BOOKED: &str =
        r"(?i)already\s+in\s+(?:the\s+|this\s+)?class|registered\s+for\s+another\s+session";

    /// The user already sits on the waitlist.
    pub const WAITLISTED: &str = r"(?i)already\s+in\s+(?:the\s+|this\s+)?wait\s*-?\s*list|already.*book";
}

/// Defaults used when the configuration omits a value.
pub mod defaults {
    pub const LEDGER_PATH: &str = "bookings.csv";

    pub const MIN_LEAD_MINUTES: u64 = 6 * 60;
    pub const MAX_LEAD_DAYS: u32 = 2;

    pub const TIME_BUDGET_SECONDS: u64 = 600;
    /// Longest accepted budget; a run is meant to finish within a day
    pub const MAX_TIME_BUDGET_SECONDS: u64 = 24 * 60 * 60;
    pub const BACKOFF_SECONDS: u64 = 15;
    pub const PROBE_TIMEOUT_SECONDS: u64 = 60;

    pub const CHECKOUT_TIMEOUT_SECONDS: u64 = 10;
    pub const LOGIN_PROMPT_TIMEOUT_SECONDS: u64 = 10;
    pub const CONFIRMATION_TIMEOUT_SECONDS: u64 = 30;
    pub const BANNER_TIMEOUT_SECONDS: u64 = 5;
}

/// Environment variables consulted at startup.
pub mod env {
    pub const ENVIRONMENT: &str = "SLOT_BOOKER_ENV";
    pub const FALLBACK_ENVIRONMENT: &str = "APP_ENV";
    pub const CONFIG_PREFIX: &str = "SLOT_BOOKER";
    pub const CONFIG_SEPARATOR: &str = "__";
}
