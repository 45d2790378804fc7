//! `SpeechEnginePort` over the `espeak-ng` command-line synthesizer.
//!
//! Each utterance is one child process. Completion is reported from the
//! child's exit status; `stop` kills whichever child is current.

use std::process::Stdio;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use seeforme_core::domain::VoiceDescriptor;
use seeforme_core::ports::{
    PlaybackCompletion, SpeechEngineError, SpeechEnginePort, SpeechOptions,
};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::debug;

const DEFAULT_BINARY: &str = "espeak-ng";

/// espeak-ng's default speed in words per minute (rate 1.0).
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// espeak-ng's default pitch on its 0-99 scale (pitch 1.0).
const BASE_PITCH: f32 = 50.0;

pub struct EspeakEngine {
    binary: String,
    /// Kill switch for the utterance currently playing.
    current: Mutex<Option<oneshot::Sender<()>>>,
}

impl EspeakEngine {
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            current: Mutex::new(None),
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<oneshot::Sender<()>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EspeakEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEnginePort for EspeakEngine {
    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SpeechEngineError> {
        let output = Command::new(&self.binary)
            .arg("--voices")
            .output()
            .await
            .map_err(|e| SpeechEngineError::Enumeration(format!("{}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(SpeechEngineError::Enumeration(
                String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            ));
        }

        Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn speak(
        &self,
        text: &str,
        options: &SpeechOptions,
        completion: PlaybackCompletion,
    ) -> Result<(), SpeechEngineError> {
        if completion.is_abandoned() {
            debug!("Utterance abandoned before playback, not starting espeak-ng");
            return Ok(());
        }

        let args = speech_args(options);
        debug!(binary = %self.binary, ?args, "Starting espeak-ng");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechEngineError::Setup(format!("{}: {e}", self.binary)))?;

        let (kill_tx, kill_rx) = oneshot::channel();
        if let Some(previous) = self.lock_current().replace(kill_tx) {
            let _ = previous.send(());
        }

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => completion.done(),
                    Ok(status) => completion.failed(format!("espeak-ng exited with {status}")),
                    Err(e) => completion.failed(e.to_string()),
                },
                _ = kill_rx => {
                    debug!("espeak-ng interrupted");
                    completion.failed("interrupted");
                }
            }
            // Dropping `child` here kills it if it is still running.
        });

        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechEngineError> {
        if let Some(kill) = self.lock_current().take() {
            let _ = kill.send(());
        }
        Ok(())
    }
}

/// Command-line flags for one utterance.
fn speech_args(options: &SpeechOptions) -> Vec<String> {
    let mut args = vec!["-s".to_owned(), words_per_minute(options.rate).to_string()];

    if let Some(pitch) = options.pitch {
        args.push("-p".to_owned());
        args.push(espeak_pitch(pitch).to_string());
    }

    if let Some(voice) = options.voice.as_deref() {
        args.push("-v".to_owned());
        args.push(voice.to_owned());
    } else if let Some(language) = options.language.as_deref() {
        args.push("-v".to_owned());
        args.push(language.to_ascii_lowercase());
    }

    args
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn words_per_minute(rate: f32) -> u32 {
    (BASE_WORDS_PER_MINUTE * rate).round().clamp(80.0, 450.0) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn espeak_pitch(pitch: f32) -> u32 {
    (BASE_PITCH * pitch).round().clamp(0.0, 99.0) as u32
}

/// Parse `espeak-ng --voices` output.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 10)
/// ```
fn parse_voices(output: &str) -> Vec<VoiceDescriptor> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let priority = fields.next()?;
            if priority.eq_ignore_ascii_case("pty") {
                return None;
            }
            let language = fields.next()?;
            let _age_gender = fields.next()?;
            let name = fields.next()?;
            Some(VoiceDescriptor::new(
                language,
                name.replace('_', " "),
                normalize_tag(language),
            ))
        })
        .collect()
}

/// `en-us` → `en-US`; anything past the region is kept verbatim.
fn normalize_tag(language: &str) -> String {
    let mut parts = language.split('-');
    let mut tag = parts.next().unwrap_or_default().to_ascii_lowercase();
    for (index, part) in parts.enumerate() {
        tag.push('-');
        if index == 0 && part.len() == 2 {
            tag.push_str(&part.to_ascii_uppercase());
        } else {
            tag.push_str(part);
        }
    }
    tag
}
