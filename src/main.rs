//! speechbox-rs CLI entry point.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use speechbox_rs::backend::{Backend, EspeakBackend, GoogleTtsBackend};
use speechbox_rs::cli::{Args, EngineKind};
use speechbox_rs::config::{LanguageCatalog, LogFormat, Settings};
use speechbox_rs::engine::{RequestError, SpeechOptions, SpeechRequest, SynthesisDispatcher};
use speechbox_rs::history::{ArtifactStatus, SessionHistory};
use speechbox_rs::storage::{AudioStore, RetentionPolicy};
use speechbox_rs::text::TextSanitizer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const PREVIEW_CHARS: usize = 60;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::from_env().context("Failed to load configuration")?;
    if let Some(dir) = &args.audio_dir {
        settings.audio_dir = dir.clone();
    }
    if let Some(minutes) = args.max_age {
        settings.retention_minutes = minutes;
    }
    if let Some(length) = args.max_length {
        settings.max_text_length = length;
    }

    init_logging(args.verbose, settings.log_format);
    tracing::debug!(?settings, "Configuration loaded");

    let catalog = match &args.catalog {
        Some(path) => LanguageCatalog::from_file(path)?,
        None => LanguageCatalog::default(),
    };

    let dispatcher = SynthesisDispatcher::new(
        EspeakBackend::detect(),
        GoogleTtsBackend::new(),
        AudioStore::new(settings.audio_dir.clone()),
    )
    .with_sanitizer(TextSanitizer::new(settings.max_text_length))
    .with_retention(RetentionPolicy::new(settings.retention_minutes))
    .with_catalog(catalog);

    // Handle utility commands first
    if args.list_voices {
        list_voices(&dispatcher);
        return Ok(());
    }

    if args.list_languages {
        list_languages(dispatcher.catalog());
        return Ok(());
    }

    if args.cleanup {
        clean_up(&dispatcher);
        return Ok(());
    }

    let texts = collect_texts(&args)?;
    if texts.is_empty() {
        eprintln!("No text given. Use -g TEXT or -i FILE to generate speech.");
        eprintln!("Run with --help for usage information.");
        return Ok(());
    }

    let options = SpeechOptions {
        voice_id: args.voice.clone(),
        rate: Some(args.rate),
        volume: Some(args.volume),
        language: Some(args.language.clone()),
        accent: args.accent.clone(),
    };

    let mut history = SessionHistory::new();
    let mut failures = 0;

    for text in &texts {
        let request = SpeechRequest::new(Some(text.clone()), args.engine).with_options(options.clone());
        let (next, result) = dispatcher.handle(history, &request);
        history = next;

        match result {
            Ok(entry) => println!("Audio generated successfully: {}", entry.audio_path.display()),
            Err(e) => {
                failures += 1;
                report_error(&e);
            }
        }
    }

    if let (Some(output), Some(latest)) = (&args.output, history.latest()) {
        let bytes = dispatcher
            .store()
            .export_artifact(&latest.audio_path, output)
            .with_context(|| format!("Failed to save audio to: {}", output.display()))?;
        println!("Audio saved to: {} ({bytes} bytes)", output.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        print_history(&history, dispatcher.store());
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} requests failed", texts.len());
    }

    Ok(())
}

fn init_logging(verbose: u8, format: LogFormat) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,speechbox_rs=info".to_string(),
            2 => "info,speechbox_rs=debug".to_string(),
            _ => "debug,speechbox_rs=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr).compact())
            .init(),
    }
}

fn collect_texts(args: &Args) -> Result<Vec<String>> {
    let mut texts = args.generate.clone();

    if let Some(path) = &args.input {
        texts.push(read_input(path)?);
    }

    Ok(texts)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read text from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read text from: {}", path.display()))
}

fn report_error(error: &RequestError) {
    if error.is_input_error() {
        eprintln!("Validation error: {error}");
        return;
    }

    match error {
        RequestError::EngineUnavailable { .. } | RequestError::Catalog(_) => eprintln!("{error}"),
        other => eprintln!("An unexpected error occurred: {other}"),
    }
}

fn list_voices<O: Backend, C: Backend>(dispatcher: &SynthesisDispatcher<O, C>) {
    if !dispatcher.available_engines().contains(&EngineKind::Offline) {
        println!("Offline voices are not available on this host.");
        println!("Use the {} engine instead (--engine cloud).", EngineKind::Cloud);
        return;
    }

    let voices = dispatcher.offline_voices();

    println!("Available voices:");
    for voice in voices {
        if voice.language.is_empty() {
            println!("  {}  {}", voice.id, voice.name);
        } else {
            println!("  {}  {} ({})", voice.id, voice.name, voice.language);
        }
    }
}

fn list_languages(catalog: &LanguageCatalog) {
    println!("Cloud languages:");
    for language in &catalog.languages {
        println!("  {} ({})", language.name, language.code);
        for accent in &language.accents {
            println!("    accent {} -> translate.google.{}", accent.name, accent.domain);
        }
    }
}

fn clean_up<O: Backend, C: Backend>(dispatcher: &SynthesisDispatcher<O, C>) {
    let report = dispatcher.clean_up();

    println!("Cleaned {}", dispatcher.store().audio_dir().display());
    println!("  Scanned: {}", report.scanned);
    println!("  Deleted: {}", report.deleted.len());
    for failure in &report.failed {
        println!("  Skipped {}: {}", failure.path.display(), failure.reason);
    }
}

fn print_history(history: &SessionHistory, store: &AudioStore) {
    println!();
    println!("History");

    if history.is_empty() {
        println!("  No audio generated yet.");
        return;
    }

    for playback in history.playback(store) {
        let entry = playback.entry;
        println!("  {} - {}", entry.timestamp, entry.engine_label);
        println!("    Text: {}", preview(entry.text.as_str()));
        match playback.status {
            ArtifactStatus::Available(bytes) => {
                println!("    Audio: {} ({} bytes)", entry.audio_path.display(), bytes.len())
            }
            ArtifactStatus::Missing => println!("    Audio file not found (it may have been cleaned)."),
        }
    }
}

fn preview(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= PREVIEW_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}...")
}
