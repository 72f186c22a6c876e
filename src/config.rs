//! User settings
//!
//! Settings live in `$XDG_CONFIG_HOME/snipdesk/config.json`. A missing file
//! yields defaults; keys missing from the file take their default value and
//! unknown keys are ignored. A file that exists but cannot be read or parsed
//! is an error.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Application directory name under the XDG base directories
pub const APP_DIR: &str = "snipdesk";

/// Config file name inside [`config_dir`]
pub const CONFIG_FILE: &str = "config.json";

/// UI colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

/// Minimum level written to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Equivalent `tracing` filter directive
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// Which capture backend to create at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Best available backend for this build
    #[default]
    Auto,
    /// Real monitors through `xcap`
    Xcap,
    /// Test pattern, no display server needed
    Mock,
}

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where saved screenshots go; `~` is expanded
    pub screenshots_dir: String,
    /// Seconds to wait before capturing
    pub default_delay:   f64,
    pub theme:           Theme,
    pub log_level:       LogLevel,
    pub capture_backend: BackendChoice,
}

impl Default for AppConfig {
    fn default() -> Self {
        let screenshots_dir = dirs::home_dir()
            .map(|home| home.join("Pictures").join("Screenshots"))
            .unwrap_or_else(|| PathBuf::from("~/Pictures/Screenshots"));

        Self {
            screenshots_dir: screenshots_dir.to_string_lossy().into_owned(),
            default_delay:   0.0,
            theme:           Theme::default(),
            log_level:       LogLevel::default(),
            capture_backend: BackendChoice::default(),
        }
    }
}

/// `$XDG_CONFIG_HOME/snipdesk`
pub fn config_dir() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoConfigDir)
}

/// `$XDG_CONFIG_HOME/snipdesk/config.json`
pub fn config_path() -> ConfigResult<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expands a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

impl AppConfig {
    /// Loads settings from the default location
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads settings from `path`, falling back to defaults when it is missing
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AppConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate_and_clamp();

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes settings to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_path()?)
    }

    /// Writes settings to `path` as pretty-printed JSON, creating parent
    /// directories as needed
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        fs::write(path, json).map_err(write_err)?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Screenshot directory with `~` expanded; created if missing
    pub fn screenshots_path(&self) -> std::io::Result<PathBuf> {
        let path = expand_tilde(&self.screenshots_dir);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    fn validate_and_clamp(&mut self) {
        if !self.default_delay.is_finite() || self.default_delay < 0.0 {
            tracing::warn!("Invalid default_delay {}, using 0", self.default_delay);
            self.default_delay = 0.0;
        }
    }
}
