//! Settings file support.
//!
//! Settings are read from a TOML file. Every key is optional; omitted keys take
//! the built-in defaults and command-line flags override whatever the file says.
//!
//! # Configuration File Format
//!
//! ```toml
//! source = "/home/me/Downloads"
//! target = "/home/me/Documents"
//! mode = "mime"            # or "extension"
//! rename = false
//!
//! [images]
//! min_width = 100
//! min_height = 100
//!
//! [logging]
//! file = "file_sorter.log"
//! max_bytes = 1048576
//! backups = 3
//! ```

use crate::classifier::{DEFAULT_MIN_IMAGE_SIZE, SortMode};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the settings file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".filesorterrc.toml";

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "file_sorter.log";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },
    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub source: PathBuf,
    pub target: PathBuf,
    pub mode: SortMode,
    pub rename: bool,
    pub images: ImageSettings,
    pub logging: LogSettings,
}

/// Minimum image size below which images are deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageSettings {
    pub min_width: usize,
    pub min_height: usize,
}

/// Log file location and rotation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    pub file: PathBuf,
    /// Size at which the log file is rotated.
    pub max_bytes: u64,
    /// Number of rotated files kept.
    pub backups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            source: home.join("Downloads"),
            target: home.join("Documents"),
            mode: SortMode::default(),
            rename: false,
            images: ImageSettings::default(),
            logging: LogSettings::default(),
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_IMAGE_SIZE,
            min_height: DEFAULT_MIN_IMAGE_SIZE,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            max_bytes: 1024 * 1024,
            backups: 3,
        }
    }
}

impl Settings {
    /// Load settings, with fallback to defaults.
    ///
    /// Attempts to load settings in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.filesorterrc.toml` in the current directory
    /// 3. Look for `~/.config/filesorter/config.toml` in the home directory
    /// 4. Fall back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing, or if any
    /// file that is found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(".config").join("filesorter").join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|reason| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

/// The user's home directory from the environment.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}
