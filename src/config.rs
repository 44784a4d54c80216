//! Application configuration.
//!
//! Two independent sources feed nictl:
//!
//! * the niri socket address, taken from `$NIRI_SOCKET` and wrapped in a
//!   [`SocketPath`] that is handed explicitly to every connection;
//! * an optional JSON file (`$XDG_CONFIG_HOME/nictl/config.json`) with
//!   tuning knobs.  A missing file is not an error.
//!
//! # Example
//!
//! ```json
//! {
//!   "fit": { "confirm_timeout_ms": 1500 }
//! }
//! ```

use crate::error::NiriError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable niri exports with its IPC socket path.
pub const SOCKET_ENV: &str = "NIRI_SOCKET";

/// Resolved location of niri's IPC socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketPath(PathBuf);

impl SocketPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Read the socket path from `$NIRI_SOCKET`.
    pub fn from_env() -> Result<Self, NiriError> {
        Self::from_var(std::env::var_os(SOCKET_ENV))
    }

    /// Build from the raw value of the environment variable.
    ///
    /// An unset or empty variable means niri is not running in this session.
    pub fn from_var(value: Option<OsString>) -> Result<Self, NiriError> {
        match value {
            Some(v) if !v.is_empty() => Ok(Self(PathBuf::from(v))),
            _ => Err(NiriError::Configuration(format!(
                "${} is not set, is niri running?",
                SOCKET_ENV
            ))),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// Top-level configuration.
///
/// Every field is optional; `{}` is a valid file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Settings for `fit-all-windows`.
    #[serde(default)]
    pub fit: FitConfig,
}

/// Settings for the layout fitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// How long to wait for niri to confirm every resize before giving up
    /// and carrying on with the refocus pass (ms).
    pub confirm_timeout_ms: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            confirm_timeout_ms: 2000,
        }
    }
}

impl FitConfig {
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }
}

impl Config {
    /// Where the config file lives: `$XDG_CONFIG_HOME/nictl/config.json`,
    /// else `$HOME/.config/nictl/config.json`.  `None` when neither variable
    /// is usable.
    pub fn default_path() -> Option<PathBuf> {
        Self::path_from(
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME"),
        )
    }

    fn path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
        let base = match xdg_config_home.filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(home.filter(|v| !v.is_empty())?).join(".config"),
        };
        Some(base.join("nictl").join("config.json"))
    }

    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::Missing(path.to_path_buf()),
            _ => ConfigError::Unreadable(path.to_path_buf(), e.to_string()),
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Invalid(path.to_path_buf(), e.to_string()))
    }

    /// Like [`load`](Config::load), but a missing file means defaults.  A
    /// file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Missing(_)) => Ok(Self::default()),
            other => other,
        }
    }
}

/// Error from loading a nictl config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config file at {}", .0.display())]
    Missing(PathBuf),
    #[error("cannot read {path}: {msg}", path = .0.display(), msg = .1)]
    Unreadable(PathBuf, String),
    #[error("invalid config {path}: {msg}", path = .0.display(), msg = .1)]
    Invalid(PathBuf, String),
}

impl From<ConfigError> for NiriError {
    fn from(e: ConfigError) -> Self {
        NiriError::Configuration(e.to_string())
    }
}
