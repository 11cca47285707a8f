//! Cloud backend using the Google Translate text-to-speech endpoint.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::cli::EngineKind;

use super::Backend;
use super::types::{BackendError, SynthesizeRequest, VoiceInfo};

/// Longest text the endpoint accepts per request, in characters.
pub const MAX_CHUNK_CHARS: usize = 100;

/// HTTP client for `translate.google.<domain>/translate_tts`.
pub struct GoogleTtsBackend {
    client: Result<reqwest::blocking::Client, String>,
    base_url: Option<String>,
}

impl GoogleTtsBackend {
    /// Create a new cloud backend.
    ///
    /// Client construction errors are kept and reported as an unavailable
    /// engine on the first synthesis call.
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("speechbox-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| e.to_string());

        Self {
            client,
            base_url: None,
        }
    }

    /// Use a pre-built HTTP client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client: Ok(client),
            base_url: None,
        }
    }

    /// Send every request to `base_url` instead of the accent's Google host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Endpoint URL for a host domain such as `com` or `co.uk`.
    pub fn endpoint(domain: &str) -> String {
        format!("https://translate.google.{domain}/translate_tts")
    }

    fn url_for(&self, domain: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{base}/translate_tts"),
            None => Self::endpoint(domain),
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, BackendError> {
        self.client.as_ref().map_err(|e| {
            BackendError::EngineUnavailable(format!("Google TTS client could not start: {e}"))
        })
    }

    fn fetch_chunk(
        &self,
        url: &str,
        request: &SynthesizeRequest,
        chunk: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, BackendError> {
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client()?
            .get(url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", request.language_code.as_str()),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "Status: {}",
                response.status()
            )));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| BackendError::RequestFailed(e.to_string()))
    }
}

impl Default for GoogleTtsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for GoogleTtsBackend {
    fn engine(&self) -> EngineKind {
        EngineKind::Cloud
    }

    fn file_extension(&self) -> &'static str {
        "mp3"
    }

    /// One voice per language, so nothing to enumerate.
    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn synthesize(&self, request: &SynthesizeRequest, output: &Path) -> Result<(), BackendError> {
        let url = self.url_for(&request.domain);
        let chunks = split_text(&request.text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(BackendError::SynthesisFailed("No text to speak".to_string()));
        }

        tracing::debug!(
            url = %url,
            language = %request.language_code,
            chunks = chunks.len(),
            "Requesting cloud synthesis"
        );

        // Fetch everything first so a failed chunk leaves no file behind.
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(&url, request, chunk, idx, chunks.len())?);
        }

        let mut file = File::create(output)?;
        file.write_all(&audio)?;
        Ok(())
    }
}

/// Split text into pieces of at most `max_chars` characters.
///
/// Splits happen at whitespace; a single word longer than `max_chars` is cut
/// into fixed-size pieces.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
