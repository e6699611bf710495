//! Configuration management module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub sync: SyncConfig,
    pub admin: AdminConfig,
    pub ui: UiConfig,
}

/// Report endpoint settings. `url` is the one value persisted between
/// sessions; empty means the app is not linked to a company yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Administrator credential pair. A report login matching both values gets
/// the elevated (admin) badge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

/// UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub show_reason_column: bool,
    pub show_gps_column: bool,
}

impl AppConfig {
    /// Get config file path (same directory as executable).
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sync.url.is_empty() && !self.sync.url.starts_with("http") {
            return Err(ConfigError::Validation(
                "Sync URL must start with http:// or https://".to_string(),
            ));
        }
        if self.sync.timeout_secs < 5 {
            return Err(ConfigError::Validation(
                "Request timeout must be at least 5 seconds".to_string(),
            ));
        }
        if self.sync.timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "Request timeout cannot exceed 300 seconds".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether a sync endpoint has been linked.
    pub fn is_linked(&self) -> bool {
        !self.sync.url.is_empty()
    }

    /// Clear the stored sync endpoint (unlink from the company).
    pub fn unlink(&mut self) {
        self.sync.url.clear();
    }

    /// Whether the given credentials match the configured administrator pair.
    pub fn is_admin(&self, username: &str, password: &str) -> bool {
        !self.admin.username.is_empty()
            && self.admin.username == username
            && self.admin.password == password
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_reason_column: true,
            show_gps_column: false,
        }
    }
}
