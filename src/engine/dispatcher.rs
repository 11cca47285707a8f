//! Request handling: validation, cleanup, synthesis and history.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::{Backend, BackendError, SynthesizeRequest, VoiceInfo};
use crate::cli::EngineKind;
use crate::config::{CatalogError, LanguageCatalog};
use crate::history::{HistoryEntry, SessionHistory};
use crate::storage::{AudioStore, CleanupReport, RetentionPolicy, StorageError, wav_duration};
use crate::text::{CleanText, TextSanitizer, ValidationError};

/// Default cloud language when a request names none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Errors a single request can end with.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message} Please switch to the {fallback} engine.")]
    EngineUnavailable {
        message: String,
        fallback: EngineKind,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Synthesis failed: {0}")]
    Backend(BackendError),
}

impl RequestError {
    /// True for errors the user fixes by changing the text.
    pub fn is_input_error(&self) -> bool {
        matches!(self, RequestError::Validation(_))
    }

    fn from_backend(engine: EngineKind, error: BackendError) -> Self {
        match error {
            BackendError::EngineUnavailable(message) => RequestError::EngineUnavailable {
                message,
                fallback: engine.fallback(),
            },
            other => RequestError::Backend(other),
        }
    }
}

/// Engine parameters for a request. Fields for the other engine are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechOptions {
    pub voice_id: Option<String>,
    pub rate: Option<u32>,
    pub volume: Option<f32>,
    pub language: Option<String>,
    pub accent: Option<String>,
}

/// Raw input for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: Option<String>,
    pub engine: EngineKind,
    pub options: SpeechOptions,
}

impl SpeechRequest {
    pub fn new(text: Option<String>, engine: EngineKind) -> Self {
        Self {
            text,
            engine,
            options: SpeechOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SpeechOptions) -> Self {
        self.options = options;
        self
    }
}

/// Routes validated text to the offline or cloud backend.
pub struct SynthesisDispatcher<O: Backend, C: Backend> {
    offline: O,
    cloud: C,
    store: AudioStore,
    sanitizer: TextSanitizer,
    retention: RetentionPolicy,
    catalog: LanguageCatalog,
}

impl<O: Backend, C: Backend> SynthesisDispatcher<O, C> {
    /// Create a dispatcher with default sanitizer, retention and catalog.
    pub fn new(offline: O, cloud: C, store: AudioStore) -> Self {
        Self {
            offline,
            cloud,
            store,
            sanitizer: TextSanitizer::default(),
            retention: RetentionPolicy::default(),
            catalog: LanguageCatalog::default(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: TextSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_catalog(mut self, catalog: LanguageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// Voices of the offline engine; empty when it cannot run here.
    pub fn offline_voices(&self) -> Vec<VoiceInfo> {
        self.offline.voices()
    }

    /// Engines usable on this host. The cloud engine is always listed.
    pub fn available_engines(&self) -> Vec<EngineKind> {
        let mut engines = Vec::with_capacity(2);
        if !self.offline_voices().is_empty() {
            engines.push(EngineKind::Offline);
        }
        engines.push(EngineKind::Cloud);
        engines
    }

    /// Run one retention pass over the working directory.
    pub fn clean_up(&self) -> CleanupReport {
        self.retention.clean_old_audio_files(self.store.audio_dir())
    }

    /// Render clean text to a new audio file and return its path.
    pub fn synthesize(
        &self,
        text: &CleanText,
        engine: EngineKind,
        options: &SpeechOptions,
    ) -> Result<PathBuf, RequestError> {
        let (request, _) = self.build_request(text, engine, options)?;
        self.render(engine, &request)
    }

    /// Handle one request end to end.
    ///
    /// The caller's history is passed in and handed back; a successful request
    /// adds its entry at the front.
    pub fn handle(
        &self,
        mut history: SessionHistory,
        request: &SpeechRequest,
    ) -> (SessionHistory, Result<HistoryEntry, RequestError>) {
        let result = self.process(&mut history, request);
        (history, result)
    }

    fn process(
        &self,
        history: &mut SessionHistory,
        request: &SpeechRequest,
    ) -> Result<HistoryEntry, RequestError> {
        let text = self.sanitizer.clean_and_validate(request.text.as_deref())?;

        tracing::info!(
            engine = %request.engine,
            text_length = text.char_count(),
            "TTS synthesis request"
        );

        self.clean_up();

        let (synth_request, language) = self.build_request(&text, request.engine, &request.options)?;
        let audio_path = self.render(request.engine, &synth_request)?;

        let entry = HistoryEntry::new(request.engine.label(), text, audio_path, language);
        history.record(entry.clone());

        Ok(entry)
    }

    fn build_request(
        &self,
        text: &CleanText,
        engine: EngineKind,
        options: &SpeechOptions,
    ) -> Result<(SynthesizeRequest, Option<String>), RequestError> {
        let request = SynthesizeRequest::new(text.as_str());

        match engine {
            EngineKind::Offline => {
                let mut request = request;
                request.voice_id = options.voice_id.clone();
                request.rate = options.rate;
                request.volume = options.volume;
                Ok((request, None))
            }
            EngineKind::Cloud => {
                let language = self
                    .catalog
                    .find(options.language.as_deref().unwrap_or(DEFAULT_LANGUAGE))?;
                let domain = language.resolve_domain(options.accent.as_deref())?;
                let request = request
                    .with_language(language.code.clone())
                    .with_domain(domain);
                Ok((request, Some(language.code.clone())))
            }
        }
    }

    fn render(&self, engine: EngineKind, request: &SynthesizeRequest) -> Result<PathBuf, RequestError> {
        let backend = self.backend(engine);

        self.store.ensure_dir()?;
        let path = self.store.new_artifact_path(backend.file_extension());

        tracing::debug!(engine = %backend.engine(), path = %path.display(), "Rendering audio");

        if let Err(e) = backend.synthesize(request, &path) {
            self.store.discard(&path);
            tracing::warn!(engine = %engine, error = %e, "Synthesis failed");
            return Err(RequestError::from_backend(engine, e));
        }

        match wav_duration(&path) {
            Some(seconds) => tracing::info!(path = %path.display(), seconds, "Audio generated"),
            None => tracing::info!(path = %path.display(), "Audio generated"),
        }

        Ok(path)
    }

    fn backend(&self, engine: EngineKind) -> &dyn Backend {
        match engine {
            EngineKind::Offline => &self.offline,
            EngineKind::Cloud => &self.cloud,
        }
    }
}
