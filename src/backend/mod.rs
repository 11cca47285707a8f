//! Speech synthesis backends.
//!
//! Provides the [`Backend`] trait and its two implementations: the offline
//! eSpeak NG subprocess and the Google Translate cloud endpoint.

mod espeak;
mod google;
mod types;

pub use espeak::{EspeakBackend, RATE_MAX, RATE_MIN, amplitude, clamp_rate, parse_voices};
pub use google::{GoogleTtsBackend, MAX_CHUNK_CHARS, split_text};
pub use types::{BackendError, SynthesizeRequest, VoiceInfo};

use std::path::Path;

use crate::cli::EngineKind;

/// Trait for speech synthesis backends.
///
/// Backends write audio straight to a path chosen by the caller, which
/// allows for mock implementations in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    /// Which engine this backend implements.
    fn engine(&self) -> EngineKind;

    /// Extension of the files this backend writes, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Voices this backend can use.
    ///
    /// Returns an empty list when the engine cannot start on this host.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Render `request` to an audio file at `output`.
    fn synthesize(&self, request: &SynthesizeRequest, output: &Path) -> Result<(), BackendError>;
}
