//! CLI argument definitions.

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Text-to-speech with an offline and a cloud engine.
#[derive(Parser, Debug)]
#[command(name = "speechbox-rs")]
#[command(about = "Convert text to speech with an offline or cloud engine")]
#[command(version)]
pub struct Args {
    /// Text to convert to speech (repeat for several requests)
    #[arg(short, long = "generate", value_name = "TEXT")]
    pub generate: Vec<String>,

    /// Read text from a file ("-" reads standard input)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// TTS engine to use
    #[arg(short, long, value_enum, default_value = "offline")]
    pub engine: EngineKind,

    /// Offline voice id (see --list-voices)
    #[arg(long)]
    pub voice: Option<String>,

    /// Speech rate in words per minute (offline only)
    #[arg(short, long, default_value = "200")]
    pub rate: u32,

    /// Volume from 0.0 to 1.0 (offline only)
    #[arg(long, default_value = "0.8")]
    pub volume: f32,

    /// Language name or code (cloud only)
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Accent variant, e.g. "UK" or "India" (cloud only)
    #[arg(short, long)]
    pub accent: Option<String>,

    /// Copy the most recent audio file to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for generated audio files
    #[arg(long, value_name = "DIR")]
    pub audio_dir: Option<PathBuf>,

    /// Delete generated audio older than this many minutes
    #[arg(long, value_name = "MINUTES")]
    pub max_age: Option<u64>,

    /// Maximum accepted text length in characters
    #[arg(long, value_name = "CHARS")]
    pub max_length: Option<usize>,

    /// JSON file with the cloud language catalog
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// List offline voices
    #[arg(long)]
    pub list_voices: bool,

    /// List cloud languages and accents
    #[arg(long)]
    pub list_languages: bool,

    /// Only clean up old audio files
    #[arg(long)]
    pub cleanup: bool,

    /// Print the session history as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Synthesis engine selection.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Local eSpeak NG synthesizer
    #[default]
    #[value(name = "offline")]
    Offline,

    /// Google Translate text-to-speech (needs network access)
    #[value(name = "cloud")]
    Cloud,
}

impl EngineKind {
    /// Returns the CLI argument string for this engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Offline => "offline",
            EngineKind::Cloud => "cloud",
        }
    }

    /// Human-readable label recorded in history entries.
    pub fn label(&self) -> &'static str {
        match self {
            EngineKind::Offline => "Offline (eSpeak NG)",
            EngineKind::Cloud => "Google TTS (cloud)",
        }
    }

    /// The other engine, suggested when this one is unavailable.
    pub fn fallback(&self) -> EngineKind {
        match self {
            EngineKind::Offline => EngineKind::Cloud,
            EngineKind::Cloud => EngineKind::Offline,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
