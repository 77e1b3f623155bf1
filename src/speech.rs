//! Pronunciation capability: platform text-to-speech behind a trait so the
//! viewer can be tested without audio, and so a platform with no speech
//! output reports that instead of crashing.

use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech output is not available on this platform")]
    Unavailable,
    #[error("Speech command failed to run: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Speech command exited with status {0}")]
    Exit(i32),
}

pub trait Speech: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

// ============================================================================
// Command-line TTS
// ============================================================================

/// Text-to-speech via an external command: `say` on macOS, `espeak` or
/// `spd-say` elsewhere.
pub struct CommandSpeech {
    command: String,
}

impl CommandSpeech {
    const CANDIDATES: &'static [&'static str] = &["say", "espeak", "spd-say"];

    /// Probe the PATH for a usable TTS command. `None` means the platform
    /// has no speech output.
    pub fn detect() -> Option<Self> {
        Self::CANDIDATES
            .iter()
            .find(|name| command_on_path(name))
            .map(|name| Self::with_command(*name))
    }

    /// Use a specific command (e.g. from configuration) without probing.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Speech for CommandSpeech {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        tracing::debug!(command = %self.command, text, "Speaking");
        let status = Command::new(&self.command)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Exit(status.code().unwrap_or(-1)))
        }
    }
}

/// Stand-in for platforms with no TTS command: every call reports
/// unavailability to the caller.
pub struct NoSpeech;

impl Speech for NoSpeech {
    fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }
}

/// The best speech backend this system offers.
pub fn system_speech() -> Box<dyn Speech> {
    match CommandSpeech::detect() {
        Some(speech) => Box::new(speech),
        None => {
            tracing::debug!("No text-to-speech command found on PATH");
            Box::new(NoSpeech)
        }
    }
}

fn command_on_path(name: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| Path::new(&dir).join(name).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_speech_reports_unavailable() {
        let result = NoSpeech.speak("Cat");
        assert!(matches!(result, Err(SpeechError::Unavailable)));
    }

    #[test]
    fn test_missing_command_is_an_error_not_a_panic() {
        let speech = CommandSpeech::with_command("definitely-not-a-tts-binary");
        assert!(speech.speak("Cat").is_err());
    }

    #[test]
    fn test_true_as_speech_command_succeeds() {
        // `true` ignores its argument and exits 0, standing in for a TTS
        // binary without making noise in CI.
        if !command_on_path("true") {
            return;
        }
        let speech = CommandSpeech::with_command("true");
        assert!(speech.speak("Cat").is_ok());
    }

    #[test]
    fn test_failing_command_reports_exit_status() {
        if !command_on_path("false") {
            return;
        }
        let speech = CommandSpeech::with_command("false");
        assert!(matches!(speech.speak("Cat"), Err(SpeechError::Exit(1))));
    }
}
