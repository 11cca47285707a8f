//! Text cleaning and validation.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;
use thiserror::Error;

/// Default maximum number of characters accepted for synthesis.
pub const DEFAULT_MAX_LENGTH: usize = 20_000;

/// Errors raised when input text cannot be used for synthesis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Text cannot be empty.")]
    EmptyInput,

    #[error("Text cannot be empty after cleaning.")]
    EmptyAfterCleaning,

    #[error("Text is too long. Max {max} characters allowed.")]
    TooLong { max: usize },
}

/// Text that passed [`TextSanitizer::clean_and_validate`].
///
/// Never empty, free of control characters other than `\n`, `\r` and `\t`,
/// trimmed, and within the sanitizer's length limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CleanText(String);

impl CleanText {
    /// Number of characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for CleanText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CleanText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CleanText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns raw user input into [`CleanText`] or rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSanitizer {
    max_length: usize,
}

impl TextSanitizer {
    /// Create a sanitizer with a custom length limit.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// The configured length limit, in characters.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Clean and validate raw text.
    ///
    /// Control characters below U+0020 are removed except newline, carriage
    /// return and tab. The result is then trimmed and checked for emptiness
    /// and length.
    ///
    /// # Examples
    /// ```
    /// use speechbox_rs::text::TextSanitizer;
    /// let clean = TextSanitizer::default().clean_and_validate(Some("Hello\x01World")).unwrap();
    /// assert_eq!(clean.as_str(), "HelloWorld");
    /// ```
    pub fn clean_and_validate(&self, text: Option<&str>) -> Result<CleanText, ValidationError> {
        let text = text.ok_or(ValidationError::EmptyInput)?;

        let filtered: String = text.chars().filter(|&ch| is_allowed(ch)).collect();
        let trimmed = filtered.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAfterCleaning);
        }

        let length = trimmed.chars().count();
        if length > self.max_length {
            return Err(ValidationError::TooLong {
                max: self.max_length,
            });
        }

        tracing::debug!(
            original_length = text.chars().count(),
            cleaned_length = length,
            "Text cleaned"
        );

        Ok(CleanText(trimmed.to_string()))
    }
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

fn is_allowed(ch: char) -> bool {
    u32::from(ch) >= 32 || matches!(ch, '\n' | '\r' | '\t')
}
