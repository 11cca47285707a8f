//! Backend request/response types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when running a synthesis backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    EngineUnavailable(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A voice offered by the offline engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: String,
}

/// Parameters for one synthesis call.
///
/// Each backend reads the fields it understands and ignores the rest:
/// voice, rate and volume apply to the offline engine, language and domain to
/// the cloud engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    pub language_code: String,
    /// Google host domain selecting the accent, e.g. `co.uk`.
    pub domain: String,
}

impl SynthesizeRequest {
    /// Create a new synthesis request.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: None,
            rate: None,
            volume: None,
            language_code: "en".to_string(),
            domain: "com".to_string(),
        }
    }

    /// Set the offline voice.
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    /// Set the speech rate in words per minute.
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set the volume (0.0 to 1.0).
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set the cloud language code.
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    /// Set the cloud host domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }
}
