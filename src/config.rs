//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::api::ClientConfig;
use crate::dashboard::DashboardSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data API connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl ApiConfig {
    /// Client settings for this connection
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_secs.saturating_mul(1000),
            max_retries: self.max_retries,
            ..ClientConfig::default()
        }
    }
}

/// Dashboard display configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_country")]
    pub default_country: String,

    #[serde(default = "default_window")]
    pub rolling_window: usize,

    #[serde(default = "default_table_rows")]
    pub table_rows: usize,

    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

fn default_country() -> String {
    "USA".to_string()
}

fn default_window() -> usize {
    crate::metrics::DEFAULT_WINDOW
}

fn default_table_rows() -> usize {
    30
}

fn default_chart_width() -> usize {
    60
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_country: default_country(),
            rolling_window: default_window(),
            table_rows: default_table_rows(),
            chart_width: default_chart_width(),
        }
    }
}

impl DashboardConfig {
    /// Display settings for the dashboard
    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            window: self.rolling_window,
            table_rows: self.table_rows,
            chart_width: self.chart_width,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
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
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("covid-pulse").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = lookup("COVID_PULSE_API_URL") {
            self.api.base_url = url;
        }
        if let Some(secs) = lookup("COVID_PULSE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.api.request_timeout_secs = secs;
        }

        // Dashboard overrides
        if let Some(country) = lookup("COVID_PULSE_COUNTRY") {
            self.dashboard.default_country = country.to_uppercase();
        }
        if let Some(window) = lookup("COVID_PULSE_WINDOW").and_then(|s| s.parse().ok()) {
            self.dashboard.rolling_window = window;
        }

        // Logging overrides
        if let Some(level) = lookup("COVID_PULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("COVID_PULSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Covid Pulse Configuration
#
# Environment variables override these settings:
# - COVID_PULSE_API_URL
# - COVID_PULSE_TIMEOUT_SECS
# - COVID_PULSE_COUNTRY
# - COVID_PULSE_WINDOW
# - COVID_PULSE_LOG_LEVEL
# - COVID_PULSE_LOG_FORMAT

[api]
# Base URL of the COVID-19 data API, including the version prefix
base_url = "http://localhost:8000/api/v1"

# Request timeout in seconds
request_timeout_secs = 10

# Retries after a failed first attempt (timeouts, 429 and 503)
max_retries = 3

[dashboard]
# Region shown by `covid-pulse dashboard` when none is given
default_country = "USA"

# Rolling-average window in days
rolling_window = 7

# Rows in the detailed data table
table_rows = 30

# Sparkline width in columns
chart_width = 60

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.dashboard.default_country, "USA");
        assert_eq!(config.dashboard.rolling_window, 7);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.api.base_url, defaults.api.base_url);
        assert_eq!(config.api.request_timeout_secs, defaults.api.request_timeout_secs);
        assert_eq!(config.dashboard.table_rows, defaults.dashboard.table_rows);
        assert_eq!(config.logging.format, defaults.logging.format);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\nrolling_window = 14\n\n[api]\nbase_url = \"http://api.test/api/v1\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dashboard.rolling_window, 14);
        assert_eq!(config.dashboard.table_rows, 30);
        assert_eq!(config.api.base_url, "http://api.test/api/v1");
        assert_eq!(config.api.client_config().request_timeout_ms, 10_000);
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard\nrolling_window = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("COVID_PULSE_API_URL", "http://other.test/api/v1"),
            ("COVID_PULSE_COUNTRY", "deu"),
            ("COVID_PULSE_WINDOW", "not-a-number"),
            ("COVID_PULSE_TIMEOUT_SECS", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://other.test/api/v1");
        assert_eq!(config.api.request_timeout_secs, 3);
        assert_eq!(config.dashboard.default_country, "DEU");
        assert_eq!(config.dashboard.rolling_window, 7);
        assert_eq!(config.api.client_config().request_timeout_ms, 3_000);
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "COVID_PULSE_TIMEOUT_SECS").then(|| "18446744073709552".to_string())
        });

        assert_eq!(config.api.request_timeout_secs, 18_446_744_073_709_552);
        assert_eq!(config.api.client_config().request_timeout_ms, u64::MAX);
    }
}
