//! Input text cleaning and validation.
//!
//! Everything handed to a synthesis backend goes through
//! [`TextSanitizer::clean_and_validate`] first.

mod sanitizer;

pub use sanitizer::{CleanText, DEFAULT_MAX_LENGTH, TextSanitizer, ValidationError};
