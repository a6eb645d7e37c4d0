//! Configuration settings for sakani.
//!
//! Settings are loaded from `~/.sakani/config.yaml`, then a small set of
//! environment variables is layered on top.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::SakaniError;

/// Overrides `backend.base_url`.
pub const BASE_URL_ENV: &str = "SAKANI_BASE_URL";
/// Overrides `backend.api_key`.
pub const API_KEY_ENV: &str = "SAKANI_API_KEY";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Backend connection settings.
    pub backend: BackendConfig,
    /// Offline queue settings.
    pub sync: SyncConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
    /// Log filter used when neither `RUST_LOG` nor `-v` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorSetting {
    /// Apply this setting to the global `colored` override.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// Backend-as-a-service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL relative endpoints are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Project API key, sent as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Path requested by the connectivity probe.
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Per-request timeout for deliveries. `None` keeps the client default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Offline queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Failed replays recorded before an action is dropped.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds between periodic replays while online.
    #[serde(default = "default_replay_interval")]
    pub replay_interval_secs: u64,
    /// Seconds between connectivity probes.
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,
    /// Key the queue snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_base_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_health_path() -> String {
    "/rest/v1/".to_string()
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_replay_interval() -> u64 {
    30
}

const fn default_probe_interval() -> u64 {
    10
}

fn default_storage_key() -> String {
    "offline_actions".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
            log_level: default_log_level(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            health_path: default_health_path(),
            request_timeout_secs: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            replay_interval_secs: default_replay_interval(),
            probe_interval_secs: default_probe_interval(),
            storage_key: default_storage_key(),
        }
    }
}

impl Config {
    /// Load configuration for the given paths and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load(paths: &Paths) -> Result<Self, SakaniError> {
        let mut config = Self::load_from_path(&paths.config_file)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, SakaniError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            SakaniError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            SakaniError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde accepts but the sync loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Config` for a zero replay or probe interval, or an empty
    /// storage key.
    pub fn validate(&self) -> Result<(), SakaniError> {
        if self.sync.replay_interval_secs == 0 {
            return Err(SakaniError::Config(
                "sync.replay_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.sync.probe_interval_secs == 0 {
            return Err(SakaniError::Config(
                "sync.probe_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.sync.storage_key.trim().is_empty() {
            return Err(SakaniError::Config(
                "sync.storage_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Layer environment overrides on top of file settings.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.backend.base_url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.backend.api_key = Some(key);
        }
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), SakaniError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| SakaniError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            SakaniError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Render the effective configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, SakaniError> {
        serde_yaml::to_string(self)
            .map_err(|e| SakaniError::Config(format!("Failed to serialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert_eq!(config.general.color, ColorSetting::Auto);
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.backend.base_url, "http://localhost:54321");
        assert!(config.backend.api_key.is_none());
        assert_eq!(config.sync.max_retries, 3);
        assert_eq!(config.sync.replay_interval_secs, 30);
        assert_eq!(config.sync.storage_key, "offline_actions");
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.sync.max_retries, 3);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.backend.base_url = "https://example.supabase.co".to_string();
        config.sync.replay_interval_secs = 60;

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();

        assert_eq!(loaded.backend.base_url, "https://example.supabase.co");
        assert_eq!(loaded.sync.replay_interval_secs, 60);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r"
sync:
  max_retries: 5
";
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.sync.max_retries, 5);
        assert_eq!(config.sync.probe_interval_secs, 10);
        assert_eq!(config.backend.health_path, "/rest/v1/");
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "sync: [not, a, map]").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, SakaniError::Config(_)));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        std::fs::write(&config_path, "sync:\n  replay_interval_secs: 0\n").unwrap();
        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("replay_interval_secs"));

        std::fs::write(&config_path, "sync:\n  probe_interval_secs: 0\n").unwrap();
        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("probe_interval_secs"));
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "sync:\n  storage_key: \"\"\n").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, SakaniError::Config(_)));
        assert!(err.to_string().contains("storage_key"));
    }

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            BASE_URL_ENV => Some("https://api.sakani.test".to_string()),
            API_KEY_ENV => Some("anon-key".to_string()),
            _ => None,
        });

        assert_eq!(config.backend.base_url, "https://api.sakani.test");
        assert_eq!(config.backend.api_key.as_deref(), Some("anon-key"));
    }

    #[test]
    fn test_empty_env_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|_| Some(String::new()));

        assert_eq!(config.backend.base_url, "http://localhost:54321");
        assert!(config.backend.api_key.is_none());
    }
}
