//! # Booker Configuration
//!
//! Everything a booking run needs is carried in one explicit [`BookerConfig`]
//! value: the schedule URL, credentials, ledger location, the wishlist
//! lookahead window, the retry budget and the per-step attempt timeouts.
//! Nothing is read from ambient globals once the config is built.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use slot_booker::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(Some("config/slot-booker.toml".into()))?;
//! let window = manager.config().window.to_window();
//! let policy = manager.config().retry.to_policy();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::booking::AttemptTimeouts;
use crate::constants::defaults;
use crate::controller::RetryPolicy;
use crate::wishlist::WishlistWindow;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `slot-booker.toml`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookerConfig {
    /// Scheduling site settings
    pub site: SiteConfig,

    /// Sign-in credentials handed to the checkout flow
    pub credentials: Credentials,

    /// Ledger storage
    #[serde(default)]
    pub ledger: LedgerSettings,

    /// Wishlist lookahead window
    #[serde(default)]
    pub window: WindowConfig,

    /// Retry budget and pacing
    #[serde(default)]
    pub retry: RetryConfig,

    /// Bounded waits inside a single booking attempt
    #[serde(default)]
    pub attempt: AttemptConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Page that renders the availability widget
    pub schedule_url: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[MASKED]")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerSettings {
    pub path: PathBuf,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::LEDGER_PATH),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Minimum time between now and a slot for it to be attempted
    pub min_lead_minutes: u64,
    /// Number of days past today that are still eligible
    pub max_lead_days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            min_lead_minutes: defaults::MIN_LEAD_MINUTES,
            max_lead_days: defaults::MAX_LEAD_DAYS,
        }
    }
}

impl WindowConfig {
    pub fn to_window(&self) -> WishlistWindow {
        WishlistWindow::new(
            Duration::from_secs(self.min_lead_minutes.saturating_mul(60)),
            self.max_lead_days,
        )
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub time_budget_seconds: u64,
    pub backoff_seconds: u64,
    pub probe_timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            time_budget_seconds: defaults::TIME_BUDGET_SECONDS,
            backoff_seconds: defaults::BACKOFF_SECONDS,
            probe_timeout_seconds: defaults::PROBE_TIMEOUT_SECONDS,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            time_budget: Duration::from_secs(self.time_budget_seconds),
            backoff: Duration::from_secs(self.backoff_seconds),
            probe_timeout: Duration::from_secs(self.probe_timeout_seconds),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct AttemptConfig {
    pub checkout_timeout_seconds: u64,
    pub login_prompt_timeout_seconds: u64,
    pub confirmation_timeout_seconds: u64,
    pub banner_timeout_seconds: u64,
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            checkout_timeout_seconds: defaults::CHECKOUT_TIMEOUT_SECONDS,
            login_prompt_timeout_seconds: defaults::LOGIN_PROMPT_TIMEOUT_SECONDS,
            confirmation_timeout_seconds: defaults::CONFIRMATION_TIMEOUT_SECONDS,
            banner_timeout_seconds: defaults::BANNER_TIMEOUT_SECONDS,
        }
    }
}

impl AttemptConfig {
    pub fn to_timeouts(&self) -> AttemptTimeouts {
        AttemptTimeouts {
            checkout: Duration::from_secs(self.checkout_timeout_seconds),
            login_prompt: Duration::from_secs(self.login_prompt_timeout_seconds),
            confirmation: Duration::from_secs(self.confirmation_timeout_seconds),
            banner: Duration::from_secs(self.banner_timeout_seconds),
        }
    }
}

impl BookerConfig {
    /// Reject configurations that could never produce a bounded, useful run
    pub fn validate(&self) -> ConfigResult<()> {
        if self.site.schedule_url.trim().is_empty() {
            return Err(ConfigurationError::missing_field("site.schedule_url"));
        }
        url::Url::parse(&self.site.schedule_url).map_err(|e| {
            ConfigurationError::invalid_value(
                "site.schedule_url",
                self.site.schedule_url.clone(),
                e.to_string(),
            )
        })?;

        if self.retry.time_budget_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "retry.time_budget_seconds",
                "0",
                "the retry loop requires a non-zero time budget",
            ));
        }
        if self.retry.time_budget_seconds > defaults::MAX_TIME_BUDGET_SECONDS {
            return Err(ConfigurationError::invalid_value(
                "retry.time_budget_seconds",
                self.retry.time_budget_seconds.to_string(),
                format!(
                    "time budget may not exceed {} seconds",
                    defaults::MAX_TIME_BUDGET_SECONDS
                ),
            ));
        }

        if self.attempt.confirmation_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "attempt.confirmation_timeout_seconds",
                "0",
                "confirmation wait must be positive",
            ));
        }

        let window_minutes = (u64::from(self.window.max_lead_days) + 1) * 24 * 60;
        if self.window.min_lead_minutes >= window_minutes {
            return Err(ConfigurationError::invalid_value(
                "window.min_lead_minutes",
                self.window.min_lead_minutes.to_string(),
                format!("window closes after {window_minutes} minutes, nothing could ever qualify"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookerConfig {
        BookerConfig {
            site: SiteConfig {
                schedule_url: "https://example.com/schedule".into(),
            },
            credentials: Credentials::new("member@example.com", "hunter22"),
            ledger: LedgerSettings::default(),
            window: WindowConfig::default(),
            retry: RetryConfig::default(),
            attempt: AttemptConfig::default(),
        }
    }

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = sample();
        assert_eq!(config.window.min_lead_minutes, 360);
        assert_eq!(config.window.max_lead_days, 2);
        assert_eq!(
            config.attempt.to_timeouts().confirmation,
            Duration::from_secs(30)
        );
        assert_eq!(config.ledger.path, PathBuf::from("bookings.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let rendered = format!("{:?}", sample().credentials);
        assert!(rendered.contains("member@example.com"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn test_validation_rejects_unbounded_or_empty_runs() {
        let mut config = sample();
        config.retry.time_budget_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { .. })
        ));

        let mut config = sample();
        config.site.schedule_url = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingField(_))
        ));

        let mut config = sample();
        config.site.schedule_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.window.max_lead_days = 0;
        config.window.min_lead_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_time_budget_upper_limit() {
        let mut config = sample();
        config.retry.time_budget_seconds = defaults::MAX_TIME_BUDGET_SECONDS;
        assert!(config.validate().is_ok());

        config.retry.time_budget_seconds = defaults::MAX_TIME_BUDGET_SECONDS + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { .. })
        ));

        config.retry.time_budget_seconds = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_lead_time_saturates() {
        let window = WindowConfig {
            min_lead_minutes: u64::MAX,
            max_lead_days: 2,
        };
        assert_eq!(window.to_window().min_lead(), Duration::from_secs(u64::MAX));
    }
}
