//! Configuration module for tasktimer.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TASKTIMER_DATA_FILE` | No | `~/.work_sessions.json` | Session record file |
//! | `TASKTIMER_DEFAULT_MINUTES` | No | 25 | Countdown length when none is given |
//! | `TASKTIMER_SOUND` | No | true | Play a sound when a timer finishes |
//! | `TASKTIMER_NOTIFICATIONS` | No | true | Show a desktop notification when a timer finishes |
//!
//! # Example
//!
//! ```no_run
//! use tasktimer::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("Sessions are stored in {}", config.data_file.display());
//! ```

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Default session file name relative to home.
const DEFAULT_DATA_FILE: &str = ".work_sessions.json";

/// Default countdown length in minutes.
pub const DEFAULT_MINUTES: u32 = 25;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for tasktimer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON file holding every recorded session.
    pub data_file: PathBuf,

    /// Countdown length used when the command line gives none.
    pub default_minutes: u32,

    /// Whether a sound is played on natural completion.
    pub sound: bool,

    /// Whether a desktop notification is shown on natural completion.
    pub desktop_notifications: bool,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `TASKTIMER_DEFAULT_MINUTES` is set but is not a positive integer
    /// - `TASKTIMER_SOUND` or `TASKTIMER_NOTIFICATIONS` is not a boolean
    /// - `TASKTIMER_DATA_FILE` is unset and the home directory cannot be determined
    pub fn from_env() -> Result<Self, ConfigError> {
        // Optional: TASKTIMER_DATA_FILE (default: ~/.work_sessions.json)
        let data_file = match env::var("TASKTIMER_DATA_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
                base_dirs.home_dir().join(DEFAULT_DATA_FILE)
            }
        };

        // Optional: TASKTIMER_DEFAULT_MINUTES (default: 25, must be > 0)
        let default_minutes = match env::var("TASKTIMER_DEFAULT_MINUTES") {
            Ok(val) => {
                let minutes = val
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "TASKTIMER_DEFAULT_MINUTES".to_string(),
                        message: format!("expected positive integer, got '{val}'"),
                    })?;
                if minutes == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "TASKTIMER_DEFAULT_MINUTES".to_string(),
                        message: "default duration must be greater than 0".to_string(),
                    });
                }
                minutes
            }
            Err(_) => DEFAULT_MINUTES,
        };

        let sound = parse_flag("TASKTIMER_SOUND", true)?;
        let desktop_notifications = parse_flag("TASKTIMER_NOTIFICATIONS", true)?;

        Ok(Self {
            data_file,
            default_minutes,
            sound,
            desktop_notifications,
        })
    }
}

/// Reads a boolean environment variable, falling back to `default` when unset.
fn parse_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(val) = env::var(key) else {
        return Ok(default);
    };

    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected true or false, got '{val}'"),
        }),
    }
}
