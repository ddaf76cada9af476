//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tunekeeper\config.toml
//! - macOS: ~/Library/Application Support/tunekeeper/config.toml
//! - Linux: ~/.config/tunekeeper/config.toml
//!
//! The config file is human-readable and editable. A different file can be
//! given on the command line with `--config`.
//!
//! ```toml
//! [library]
//! db_path = "/home/me/.local/share/tunekeeper/library.db"
//! library_dir = "/home/me/Music"
//!
//! [import]
//! match_threshold = 1.0
//! overwrite_album_info = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::matcher::DEFAULT_MATCH_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library settings
    pub library: LibraryConfig,

    /// Settings for adding albums
    pub import: ImportConfig,
}

/// Library location settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Root directory of the music collection
    pub library_dir: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            library_dir: None,
        }
    }
}

/// Settings for adding albums
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Minimum match value for two tracks to count as the same track
    pub match_threshold: f64,

    /// Whether the added album's fields and paths replace those of an
    /// existing album it is merged into
    pub overwrite_album_info: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            overwrite_album_info: false,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunekeeper"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Default database location in the OS data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tunekeeper"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("library.db")
}

/// Load configuration.
///
/// An explicitly given file must exist and parse. Without one, the default
/// location is used if present; a missing or unreadable default file only
/// logs a warning and yields the default config.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_from(path);
    }

    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Ok(Config::default());
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    match load_from(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Ok(Config::default())
        }
    }
}

/// Load configuration from a specific file.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

impl From<ConfigError> for crate::error::Error {
    fn from(err: ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
