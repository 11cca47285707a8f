//! TTS request orchestrator.
//!
//! This module provides the dispatcher that coordinates the sanitizer, the
//! retention policy, the backends and the session history for each request.

mod dispatcher;

pub use dispatcher::{
    DEFAULT_LANGUAGE, RequestError, SpeechOptions, SpeechRequest, SynthesisDispatcher,
};
