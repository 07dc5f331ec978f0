//! # Structured Logging Module
//!
//! Environment-aware structured logging for booking runs. Console output is
//! either human-readable or JSON, and every component logs through the
//! `log_*!` macros so events carry an `operation` field and a timestamp.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::env;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("Invalid log format: {other}")),
        }
    }
}

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` wins over the environment-derived level. `verbosity` raises the
/// level when set (1 = debug, 2+ = trace). Safe to call more than once.
pub fn init_structured_logging(format: LogFormat, verbosity: u8) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = match verbosity {
            0 => get_log_level(&environment).to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        };
        let filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level))
        };

        let layer = match format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter())
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter())
                .boxed(),
        };

        // Embedding programs may already own the global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - keeping it");
        }

        tracing::debug!(
            environment = %environment,
            level = %log_level,
            format = ?format,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(env::ENVIRONMENT)
        .or_else(|_| std::env::var(env::FALLBACK_ENVIRONMENT))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log ledger operations
#[macro_export]
macro_rules! log_ledger {
    ($level:ident, $operation:expr, timestamp: $timestamp:expr, $($key:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timeslot = %$timestamp,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "LEDGER_{} ({})", $operation, $timestamp
        );
    };
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "LEDGER_{}", $operation
        );
    };
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "LEDGER_{}", $operation
        );
    };
}

/// Log booking attempt and retry cycle operations
#[macro_export]
macro_rules! log_booking {
    ($level:ident, $operation:expr, attempt_id: $attempt_id:expr, $($key:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            attempt_id = %$attempt_id,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "BOOKING_{}", $operation
        );
    };
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "BOOKING_{}", $operation
        );
    };
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "BOOKING_{}", $operation
        );
    };
}

/// Log configuration operations
#[macro_export]
macro_rules! log_config {
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}
