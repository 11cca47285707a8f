//! Offline backend driving the eSpeak NG command-line synthesizer.

use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::cli::EngineKind;

use super::Backend;
use super::types::{BackendError, SynthesizeRequest, VoiceInfo};

/// Programs probed, in order, by [`EspeakBackend::detect`].
pub const PROGRAMS: [&str; 2] = ["espeak-ng", "espeak"];

/// Slowest rate eSpeak accepts, in words per minute.
pub const RATE_MIN: u32 = 80;
/// Fastest rate eSpeak accepts, in words per minute.
pub const RATE_MAX: u32 = 450;

const DEFAULT_VOLUME: f32 = 1.0;

/// eSpeak NG (or classic eSpeak) invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct EspeakBackend {
    program: String,
}

impl EspeakBackend {
    /// Use a specific program name or path.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Pick the first eSpeak program that runs on this host.
    ///
    /// Falls back to `espeak-ng` when none does, so synthesis later reports
    /// the engine as unavailable.
    pub fn detect() -> Self {
        PROGRAMS
            .iter()
            .find(|program| runs(program))
            .map(|program| Self::new(*program))
            .unwrap_or_else(|| {
                tracing::debug!("No eSpeak program found on PATH");
                Self::new(PROGRAMS[0])
            })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for one synthesis call. Text goes to stdin.
    pub fn build_args(&self, request: &SynthesizeRequest, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-w".into(), output.as_os_str().to_owned()];

        if let Some(rate) = request.rate {
            args.push("-s".into());
            args.push(clamp_rate(rate).to_string().into());
        }

        if let Some(volume) = request.volume {
            args.push("-a".into());
            args.push(amplitude(volume).to_string().into());
        }

        if let Some(voice) = request.voice_id.as_deref().filter(|v| !v.is_empty()) {
            args.push("-v".into());
            args.push(voice.into());
        }

        args.push("--stdin".into());
        args
    }

    fn unavailable(&self) -> BackendError {
        BackendError::EngineUnavailable(format!(
            "Offline TTS ({}) is not available on this host.",
            self.program
        ))
    }
}

impl Default for EspeakBackend {
    fn default() -> Self {
        Self::detect()
    }
}

impl Backend for EspeakBackend {
    fn engine(&self) -> EngineKind {
        EngineKind::Offline
    }

    fn file_extension(&self) -> &'static str {
        "wav"
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        let output = match Command::new(&self.program).arg("--voices").output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                tracing::debug!(program = %self.program, status = %output.status, "Voice listing failed");
                return Vec::new();
            }
            Err(e) => {
                tracing::debug!(program = %self.program, error = %e, "Offline engine not runnable");
                return Vec::new();
            }
        };

        parse_voices(&String::from_utf8_lossy(&output.stdout))
    }

    fn synthesize(&self, request: &SynthesizeRequest, output: &Path) -> Result<(), BackendError> {
        let args = self.build_args(request, output);
        tracing::debug!(program = %self.program, ?args, "Running offline synthesis");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => self.unavailable(),
                _ => BackendError::IoError(e),
            })?;

        // The child may exit early and close its end of the pipe. Reap it
        // before reporting so its stderr is not lost.
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(request.text.as_bytes()),
            None => Ok(()),
        };

        let result = child.wait_with_output()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(BackendError::SynthesisFailed(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }

        sent.map_err(|e| {
            BackendError::SynthesisFailed(format!("Could not send text to {}: {e}", self.program))
        })?;

        if !output.is_file() {
            return Err(BackendError::SynthesisFailed(format!(
                "{} produced no audio file",
                self.program
            )));
        }

        Ok(())
    }
}

/// Clamp a words-per-minute rate to what eSpeak supports.
pub fn clamp_rate(rate: u32) -> u32 {
    rate.clamp(RATE_MIN, RATE_MAX)
}

/// Convert a 0.0–1.0 volume into eSpeak's amplitude scale (0–100).
pub fn amplitude(volume: f32) -> u32 {
    let volume = if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        DEFAULT_VOLUME
    };
    (volume * 100.0).round() as u32
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
pub fn parse_voices(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                return None;
            }
            Some(VoiceInfo {
                id: fields[4].to_string(),
                name: fields[3].replace('_', " "),
                language: fields[1].to_string(),
            })
        })
        .collect()
}

fn runs(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}
