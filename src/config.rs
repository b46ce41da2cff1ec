//! Configuration file parser for ~/.config/listsync/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning, since they are
//! usually typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;

/// Environment variable that overrides the API base URL.
pub const API_URL_ENV: &str = "LISTSYNC_API_URL";

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
/// Remaining scroll distance (px-equivalent) that triggers the next page.
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 200.0;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the list API (without the `/api` suffix).
    /// `LISTSYNC_API_URL` takes precedence over this value.
    pub api_url: String,

    /// Items requested per page.
    pub page_size: u32,

    /// Quiet period before a typed search is committed.
    pub search_debounce_ms: u64,

    /// Remaining scroll distance at which the next page is requested.
    pub scroll_threshold: f64,

    /// Restore the previous selection/order when saving it fails.
    pub rollback_on_persist_failure: bool,

    /// Ask the server not to apply its custom order to list pages.
    pub no_reorder: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            rollback_on_persist_failure: true,
            no_reorder: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "api_url",
        "page_size",
        "search_debounce_ms",
        "scroll_threshold",
        "rollback_on_persist_failure",
        "no_reorder",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(api_url = %config.api_url, page_size = config.page_size, "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.scroll_threshold.is_finite() || self.scroll_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                key: "scroll_threshold",
                reason: format!("must be a non-negative number, got {}", self.scroll_threshold),
            });
        }
        Ok(())
    }

    /// Apply the `LISTSYNC_API_URL` override if `value` is set and non-empty.
    pub fn apply_api_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            tracing::debug!(api_url = %url, "Using API URL from environment");
            self.api_url = url;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("listsync_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.scroll_threshold, 200.0);
        assert!(config.rollback_on_persist_failure);
        assert!(!config.no_reorder);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/listsync_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = temp_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = temp_config("partial", "page_size = 50\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.api_url, "http://localhost:5000");
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_url = "https://lists.example.com"
page_size = 40
search_debounce_ms = 150
scroll_threshold = 80.5
rollback_on_persist_failure = false
no_reorder = true
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.api_url, "https://lists.example.com");
        assert_eq!(config.page_size, 40);
        assert_eq!(config.search_debounce_ms, 150);
        assert_eq!(config.scroll_threshold, 80.5);
        assert!(!config.rollback_on_persist_failure);
        assert!(config.no_reorder);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::parse("this is not [valid toml");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("page_size = \"twenty\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("page_size = 10\ntheme = \"dark\"\n").unwrap();
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = Config::parse("page_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "page_size", .. }));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = Config::parse("scroll_threshold = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "scroll_threshold",
                ..
            }
        ));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = temp_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    #[test]
    fn test_api_url_override() {
        let mut config = Config::default();
        config.apply_api_url_override(Some("http://10.0.0.5:8080".to_string()));
        assert_eq!(config.api_url, "http://10.0.0.5:8080");

        config.apply_api_url_override(Some("  ".to_string()));
        assert_eq!(config.api_url, "http://10.0.0.5:8080");

        config.apply_api_url_override(None);
        assert_eq!(config.api_url, "http://10.0.0.5:8080");
    }
}
