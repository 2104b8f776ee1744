//! Configuration: `config.toml` under the storyteller home directory.
//!
//! A missing file means defaults. Command-line flags are applied on top by
//! the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::reveal::RevealConfig;

pub mod paths {
    //! Path resolution for storyteller configuration and data.
    //!
    //! STORYTELLER_HOME resolution order:
    //! 1. STORYTELLER_HOME environment variable (if set)
    //! 2. ~/.config/storyteller (default)
    //! 3. ./.storyteller when no home directory can be determined

    use std::path::PathBuf;

    /// Environment variable overriding the home directory.
    pub const HOME_ENV: &str = "STORYTELLER_HOME";

    /// Returns the storyteller home directory.
    pub fn storyteller_home() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".storyteller"),
            |h| h.join(".config").join("storyteller"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        storyteller_home().join("config.toml")
    }

    /// Returns the path of the persisted client session id.
    pub fn session_id_path() -> PathBuf {
        storyteller_home().join("session_id")
    }

    /// Returns the default log file path.
    pub fn log_path() -> PathBuf {
        storyteller_home().join("storyteller.log")
    }
}

/// Reveal pacing as stored in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    /// Tick period in milliseconds.
    pub tick_ms: u64,
    /// Characters per millisecond of tick period.
    pub reveal_ratio: u32,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            tick_ms: 14,
            reveal_ratio: RevealConfig::DEFAULT_RATIO,
        }
    }
}

impl RevealSettings {
    /// Engine configuration for these settings.
    pub const fn to_reveal_config(self) -> RevealConfig {
        RevealConfig {
            period: Duration::from_millis(self.tick_ms),
            reveal_ratio: self.reveal_ratio,
        }
    }
}

/// HTTP timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Overall timeout for non-streaming requests (0 disables).
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 120,
        }
    }
}

impl HttpSettings {
    /// Connect timeout.
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout, if enabled.
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the story server.
    pub server_url: String,
    /// Typewriter pacing.
    pub reveal: RevealSettings,
    /// HTTP settings.
    pub http: HttpSettings,
    /// Log file location (defaults to the home directory).
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Self::DEFAULT_SERVER_URL.to_string(),
            reveal: RevealSettings::default(),
            http: HttpSettings::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Server used when nothing is configured.
    pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Resolved log file path.
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(paths::log_path)
    }
}
