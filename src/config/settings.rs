//! Runtime settings loaded from the environment.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::storage::DEFAULT_MAX_AGE_MINUTES;
use crate::text::DEFAULT_MAX_LENGTH;

pub const ENV_AUDIO_DIR: &str = "SPEECHBOX_AUDIO_DIR";
pub const ENV_MAX_TEXT_LENGTH: &str = "SPEECHBOX_MAX_TEXT_LENGTH";
pub const ENV_RETENTION_MINUTES: &str = "SPEECHBOX_RETENTION_MINUTES";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Could not read catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings shared by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub audio_dir: PathBuf,
    pub max_text_length: usize,
    pub retention_minutes: u64,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let audio_dir = lookup(ENV_AUDIO_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.audio_dir);

        let max_text_length = match lookup(ENV_MAX_TEXT_LENGTH) {
            Some(value) => parse_number(ENV_MAX_TEXT_LENGTH, &value)?,
            None => defaults.max_text_length,
        };

        let retention_minutes = match lookup(ENV_RETENTION_MINUTES) {
            Some(value) => parse_number(ENV_RETENTION_MINUTES, &value)?,
            None => defaults.retention_minutes,
        };

        let log_format = lookup(ENV_LOG_FORMAT)
            .map(|s| match s.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            })
            .unwrap_or_default();

        Ok(Self {
            audio_dir,
            max_text_length,
            retention_minutes,
            log_format,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            max_text_length: DEFAULT_MAX_LENGTH,
            retention_minutes: DEFAULT_MAX_AGE_MINUTES,
            log_format: LogFormat::Pretty,
        }
    }
}

/// `<cache dir>/speechbox-rs/audio`, or the temp dir when no cache dir exists.
pub fn default_audio_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("speechbox-rs")
        .join("audio")
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
