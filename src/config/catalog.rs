//! Cloud engine languages and accent variants.
//!
//! Accent variants are data: each language lists the Google host domains that
//! select a regional pronunciation. A language without accents always uses its
//! `default_domain`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::settings::ConfigError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unsupported language: {0}")]
    UnknownLanguage(String),

    #[error("Unknown accent '{accent}' for {language}")]
    UnknownAccent { language: String, accent: String },
}

/// A regional pronunciation and the host domain that selects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccentOption {
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    pub name: String,
    pub code: String,
    #[serde(default = "default_domain")]
    pub default_domain: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accents: Vec<AccentOption>,
}

impl LanguageOption {
    fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            default_domain: default_domain(),
            accents: Vec::new(),
        }
    }

    fn with_accent(mut self, name: &str, domain: &str) -> Self {
        self.accents.push(AccentOption {
            name: name.to_string(),
            domain: domain.to_string(),
        });
        self
    }

    /// Host domain for `accent`, or the default domain when none is given.
    pub fn resolve_domain(&self, accent: Option<&str>) -> Result<String, CatalogError> {
        let Some(accent) = accent else {
            return Ok(self.default_domain.clone());
        };

        if self.accents.is_empty() {
            tracing::warn!(
                language = %self.code,
                accent,
                "Language has no accent variants, using default domain"
            );
            return Ok(self.default_domain.clone());
        }

        self.accents
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(accent))
            .map(|a| a.domain.clone())
            .ok_or_else(|| CatalogError::UnknownAccent {
                language: self.name.clone(),
                accent: accent.to_string(),
            })
    }
}

fn default_domain() -> String {
    "com".to_string()
}

/// Languages offered by the cloud engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCatalog {
    pub languages: Vec<LanguageOption>,
}

impl LanguageCatalog {
    /// Load a catalog from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&json).map_err(|source| ConfigError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find a language by name or code, ignoring case.
    pub fn find(&self, name_or_code: &str) -> Result<&LanguageOption, CatalogError> {
        let wanted = name_or_code.trim();
        self.languages
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(wanted) || l.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CatalogError::UnknownLanguage(wanted.to_string()))
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        let english = LanguageOption::new("English", "en")
            .with_accent("Default", "com")
            .with_accent("India", "co.in")
            .with_accent("US", "com")
            .with_accent("UK", "co.uk")
            .with_accent("Australia", "com.au");

        Self {
            languages: vec![
                english,
                LanguageOption::new("Hindi", "hi"),
                LanguageOption::new("Telugu", "te"),
                LanguageOption::new("Tamil", "ta"),
                LanguageOption::new("Kannada", "kn"),
                LanguageOption::new("Malayalam", "ml"),
                LanguageOption::new("Marathi", "mr"),
                LanguageOption::new("Gujarati", "gu"),
                LanguageOption::new("Spanish", "es"),
                LanguageOption::new("French", "fr"),
            ],
        }
    }
}
