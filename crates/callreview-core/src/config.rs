//! Configuration management for the sales call review client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Persisted session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Dashboard page sizes and windows
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Chat widget configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin; requests go to `{base_url}/api/...`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds, none by default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Persisted session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key/value file holding the bearer token
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Calls fetched for the rep dashboard
    #[serde(default = "default_rep_page_size")]
    pub rep_page_size: u32,

    /// Calls fetched for the manager dashboard
    #[serde(default = "default_manager_page_size")]
    pub manager_page_size: u32,

    /// Calls listed on the manager dashboard
    #[serde(default = "default_list_display_limit")]
    pub list_display_limit: usize,

    /// Calls included in an exported report
    #[serde(default = "default_export_call_limit")]
    pub export_call_limit: usize,

    /// Look-back for "this week" counters, in days
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,

    /// Objections shown on the manager dashboard
    #[serde(default = "default_top_objections")]
    pub top_objections: usize,
}

/// Chat widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Messages kept when history is loaded
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("callreview").join("storage.json"))
        .unwrap_or_else(|| PathBuf::from("callreview-storage.json"))
}

const fn default_rep_page_size() -> u32 {
    10
}

const fn default_manager_page_size() -> u32 {
    20
}

const fn default_list_display_limit() -> usize {
    10
}

const fn default_export_call_limit() -> usize {
    10
}

const fn default_recent_window_days() -> i64 {
    7
}

const fn default_top_objections() -> usize {
    5
}

const fn default_history_limit() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rep_page_size: default_rep_page_size(),
            manager_page_size: default_manager_page_size(),
            list_display_limit: default_list_display_limit(),
            export_call_limit: default_export_call_limit(),
            recent_window_days: default_recent_window_days(),
            top_objections: default_top_objections(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from `callreview.toml` (optional) and `CALLREVIEW__*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        Self::build(Path::new("callreview"), false)
    }

    /// Load configuration from a file that must exist (extension optional) plus the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, or if configuration cannot be
    /// loaded, parsed or validated.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        Self::build(path, true)
    }

    fn build(path: &Path, required: bool) -> crate::Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix("CALLREVIEW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values the client cannot work with
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> crate::Result<()> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(crate::Error::validation(
                "api.base_url",
                format!("must be an http(s) URL, got '{base}'"),
            ));
        }
        if self.dashboard.rep_page_size == 0 {
            return Err(crate::Error::validation("dashboard.rep_page_size", "must be positive"));
        }
        if self.dashboard.manager_page_size == 0 {
            return Err(crate::Error::validation(
                "dashboard.manager_page_size",
                "must be positive",
            ));
        }
        if self.chat.history_limit == 0 {
            return Err(crate::Error::validation("chat.history_limit", "must be positive"));
        }
        Ok(())
    }

    /// Backend API root, `{base_url}/api` without a trailing slash
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}/api", self.api.base_url.trim().trim_end_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:8001");
        assert!(config.api.request_timeout_secs.is_none());
        assert!(config.session.storage_path.ends_with("storage.json"));

        assert_eq!(config.dashboard.rep_page_size, 10);
        assert_eq!(config.dashboard.manager_page_size, 20);
        assert_eq!(config.dashboard.list_display_limit, 10);
        assert_eq!(config.dashboard.export_call_limit, 10);
        assert_eq!(config.dashboard.recent_window_days, 7);
        assert_eq!(config.dashboard.top_objections, 5);

        assert_eq!(config.chat.history_limit, 10);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_root_strips_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "https://calls.example.com/".to_string();
        assert_eq!(config.api_root(), "https://calls.example.com/api");
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://nope".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.dashboard.manager_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callreview.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://coach.example.com\"\n\n[dashboard]\nrep_page_size = 25\n"
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.api.base_url, "https://coach.example.com");
        assert_eq!(config.dashboard.rep_page_size, 25);
        assert_eq!(config.dashboard.manager_page_size, 20);
        assert_eq!(config.chat.history_limit, 10);
    }

    #[test]
    fn test_load_from_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("no-such-config.toml"));
        assert!(matches!(result, Err(crate::Error::Configuration { .. })));
    }

    #[test]
    fn test_config_serialization_round_trips_sections() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dashboard.top_objections, config.dashboard.top_objections);
        assert_eq!(back.api.base_url, config.api.base_url);
    }
}
