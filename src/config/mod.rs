//! Configuration: environment-driven settings and the cloud language catalog.

mod catalog;
mod settings;

pub use catalog::{AccentOption, CatalogError, LanguageCatalog, LanguageOption};
pub use settings::{
    ConfigError, ENV_AUDIO_DIR, ENV_LOG_FORMAT, ENV_MAX_TEXT_LENGTH, ENV_RETENTION_MINUTES,
    LogFormat, Settings, default_audio_dir,
};
