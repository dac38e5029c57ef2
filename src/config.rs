//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\earshot\config.toml
//! - macOS: ~/Library/Application Support/earshot/config.toml
//! - Linux: ~/.config/earshot/config.toml
//!
//! The config file is human-readable and editable. Provider credentials can
//! also come from the environment or the command line, which take precedence
//! over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::{DEFAULT_MAX_DURATION, MAX_CAPTURE_DURATION};
use crate::recognition::domain::{ConfigurationError, Credentials};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fingerprint provider endpoint and credentials
    pub provider: ProviderConfig,

    /// Audio capture settings
    pub capture: CaptureConfig,

    /// Recognition settings
    pub recognition: RecognitionConfig,
}

/// Provider endpoint and credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Host such as `identify-eu-west-1.acrcloud.com`
    pub host: Option<String>,
    pub access_key: Option<String>,
    pub access_secret: Option<String>,
}

impl ProviderConfig {
    /// Replace fields with any overrides that are set.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        access_key: Option<String>,
        access_secret: Option<String>,
    ) -> Self {
        if host.is_some() {
            self.host = host;
        }
        if access_key.is_some() {
            self.access_key = access_key;
        }
        if access_secret.is_some() {
            self.access_secret = access_secret;
        }
        self
    }

    /// Validate that every credential is present.
    ///
    /// Blank values count as missing. Checked in order host, access key,
    /// access secret; the first missing one is reported.
    pub fn credentials(&self) -> Result<Credentials, ConfigurationError> {
        Ok(Credentials {
            host: required(&self.host, "host")?,
            access_key: required(&self.access_key, "access_key")?,
            access_secret: required(&self.access_secret, "access_secret")?,
        })
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigurationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigurationError::MissingCredential(name))
}

/// Audio capture settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Length of the rolling capture window in seconds
    pub max_duration_secs: u64,

    /// Input device name (empty = system default)
    pub device: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: DEFAULT_MAX_DURATION.as_secs(),
            device: String::new(),
        }
    }
}

impl CaptureConfig {
    /// Capture window, between one second and [`MAX_CAPTURE_DURATION`].
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs.max(1)).min(MAX_CAPTURE_DURATION)
    }

    /// Configured device, or `None` for the default input.
    pub fn device(&self) -> Option<&str> {
        Some(self.device.trim()).filter(|d| !d.is_empty())
    }
}

/// Recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Per-segment request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
        }
    }
}

impl RecognitionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("earshot"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, with the same fallbacks as [`load`].
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
