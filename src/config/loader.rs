//! Configuration Loader
//!
//! Layers an optional TOML file under `SLOT_BOOKER__`-prefixed environment
//! variables, deserializes the result into [`BookerConfig`] and validates it.

use super::error::ConfigResult;
use super::BookerConfig;
use crate::constants::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Base name searched in the working directory when no path is given
const DEFAULT_CONFIG_BASENAME: &str = "slot-booker";

/// Keys whose values never reach log output
const SENSITIVE_PATTERNS: &[&str] = &["password", "secret", "token", "credential_key"];

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: BookerConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `path` (required if given) or from
    /// `./slot-booker.toml` (optional), then apply environment overrides
    pub fn load(path: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let mut builder = config::Config::builder();

        builder = match &path {
            Some(p) => builder.add_source(config::File::from(p.as_path()).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(env::CONFIG_PREFIX)
                .separator(env::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

        let config: BookerConfig = builder.build()?.try_deserialize()?;
        Self::finish(config, path)
    }

    /// Build configuration from an in-memory TOML document (no env layering)
    pub fn from_toml_str(document: &str) -> ConfigResult<Arc<ConfigManager>> {
        let config: BookerConfig = config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Self::finish(config, None)
    }

    fn finish(config: BookerConfig, source: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;

        debug!(
            "Configuration loaded: {}",
            serde_json::to_string(&sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        crate::log_config!(info, "Configuration loaded successfully",
            source: source.as_ref().map(|p| p.display().to_string()),
            schedule_url: config.site.schedule_url.clone(),
            ledger: config.ledger.path.display().to_string()
        );

        Ok(Arc::new(ConfigManager { config, source }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &BookerConfig {
        &self.config
    }

    /// File the configuration was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Configuration as JSON with sensitive fields masked
    pub fn debug_config(&self) -> serde_json::Value {
        sanitize_config_for_logging(&self.config)
    }
}

fn sanitize_config_for_logging(config: &BookerConfig) -> serde_json::Value {
    let mut config_json = serde_json::json!(config);
    sanitize_json_recursive(&mut config_json);
    config_json
}

fn sanitize_json_recursive(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                if SENSITIVE_PATTERNS.iter().any(|p| key_lower.contains(p)) {
                    *val = match val {
                        serde_json::Value::String(s) if s.is_empty() => {
                            serde_json::Value::String("[EMPTY]".to_string())
                        }
                        _ => serde_json::Value::String("[MASKED]".to_string()),
                    };
                } else {
                    sanitize_json_recursive(val);
                }
            }
        }
        serde_json::Value::Array(arr) => arr.iter_mut().for_each(sanitize_json_recursive),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationError;
    use std::time::Duration;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
        [site]
        schedule_url = "https://studio.example.com/schedule"

        [credentials]
        username = "member@example.com"
        password = "s3cret-pass"
    "#;

    #[test]
    fn test_minimal_document_gets_documented_defaults() {
        let manager = ConfigManager::from_toml_str(MINIMAL).unwrap();
        let config = manager.config();
        assert_eq!(config.retry.to_policy().backoff, Duration::from_secs(15));
        assert_eq!(config.window.to_window().max_lead_days(), 2);
        assert!(manager.source().is_none());
    }

    #[test]
    fn test_sections_override_defaults() {
        let document = format!(
            "{MINIMAL}\n[window]\nmin_lead_minutes = 90\n\n[retry]\ntime_budget_seconds = 120\n"
        );
        let manager = ConfigManager::from_toml_str(&document).unwrap();
        assert_eq!(manager.config().window.min_lead_minutes, 90);
        assert_eq!(manager.config().window.max_lead_days, 2);
        assert_eq!(
            manager.config().retry.to_policy().time_budget,
            Duration::from_secs(120)
        );
    }

    #[test]
    fn test_missing_credentials_fail_to_load() {
        let result = ConfigManager::from_toml_str(
            "[site]\nschedule_url = \"https://studio.example.com\"\n",
        );
        assert!(matches!(result, Err(ConfigurationError::Load(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("booker.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let manager = ConfigManager::load(Some(path.clone())).unwrap();
        assert_eq!(manager.source(), Some(path.as_path()));
        assert_eq!(manager.config().credentials.username, "member@example.com");
    }

    #[test]
    fn test_debug_config_masks_password() {
        let manager = ConfigManager::from_toml_str(MINIMAL).unwrap();
        let rendered = manager.debug_config().to_string();
        assert!(!rendered.contains("s3cret-pass"));
        assert!(rendered.contains("[MASKED]"));
        assert!(rendered.contains("member@example.com"));
    }
}
