//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/insightboard/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/insightboard/` (~/.config/insightboard/)
//! - State/Logs: `$XDG_STATE_HOME/insightboard/` (~/.local/state/insightboard/)

use crate::analytics::{DayBoundary, DEFAULT_SERIES_DAYS, DEFAULT_TOP_STAGES};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `source.api_key` is not set.
pub const API_KEY_ENV: &str = "INSIGHTBOARD_API_KEY";

/// Environment variable consulted when `source.url` is not set.
pub const SOURCE_URL_ENV: &str = "INSIGHTBOARD_SOURCE_URL";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Hosted backend connection
    #[serde(default)]
    pub source: SourceConfig,

    /// Metric computation settings
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted backend (REST) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Project base URL (e.g., `https://abc.supabase.co`)
    pub url: Option<String>,

    /// Anonymous or service API key (can also use `INSIGHTBOARD_API_KEY`)
    pub api_key: Option<String>,

    /// Table holding interaction rows
    #[serde(default = "default_table")]
    pub table: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: default_table(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl SourceConfig {
    /// URL from config, falling back to the environment.
    pub fn resolved_url(&self) -> Option<String> {
        self.url
            .clone()
            .or_else(|| std::env::var(SOURCE_URL_ENV).ok())
            .filter(|u| !u.trim().is_empty())
    }

    /// API key from config, falling back to the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.resolved_url().is_none() {
            return Err(Error::Config(format!(
                "source.url is required (or set {})",
                SOURCE_URL_ENV
            )));
        }
        if self.resolved_api_key().is_none() {
            return Err(Error::Config(format!(
                "source.api_key is required (or set {})",
                API_KEY_ENV
            )));
        }
        if self.table.trim().is_empty() {
            return Err(Error::Config("source.table must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "source.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_table() -> String {
    "HORSE".to_string()
}

fn default_source_timeout() -> u64 {
    30
}

/// Metric computation settings
#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    /// Placeholder revenue credited for each conversion
    #[serde(default = "default_revenue_per_conversion")]
    pub revenue_per_conversion: f64,

    /// Number of most recent days kept in daily series
    #[serde(default = "default_series_days")]
    pub series_days: usize,

    /// Number of labels kept in the stage distribution
    #[serde(default = "default_top_stages")]
    pub top_stages: usize,

    /// Time zone deciding which calendar day a timestamp falls on
    #[serde(default)]
    pub day_boundary: DayBoundary,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            revenue_per_conversion: default_revenue_per_conversion(),
            series_days: default_series_days(),
            top_stages: default_top_stages(),
            day_boundary: DayBoundary::default(),
        }
    }
}

fn default_revenue_per_conversion() -> f64 {
    150.0
}

fn default_series_days() -> usize {
    DEFAULT_SERIES_DAYS
}

fn default_top_stages() -> usize {
    DEFAULT_TOP_STAGES
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/insightboard/config.toml` (~/.config/insightboard/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("insightboard").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/insightboard/` (~/.local/state/insightboard/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("insightboard")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/insightboard/insightboard.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("insightboard.log")
    }
}
