//! Platform text-to-speech port.
//!
//! Playback completion is asynchronous: `speak` only *starts* playback and
//! hands the adapter a [`PlaybackCompletion`]. The adapter resolves it when
//! the platform reports that playback finished or failed. An adapter that
//! never resolves it is tolerated; the coordinator bounds the wait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::VoiceDescriptor;

/// Errors reported by a speech engine adapter.
#[derive(Debug, Clone, Error)]
pub enum SpeechEngineError {
    /// Voices could not be listed.
    #[error("Voice enumeration failed: {0}")]
    Enumeration(String),

    /// Playback could not be started with the given options.
    #[error("Speech setup failed: {0}")]
    Setup(String),

    /// The engine refused to stop.
    #[error("Failed to stop speech: {0}")]
    Stop(String),
}

/// Options for one utterance.
///
/// `voice` and `language` are both optional; when both are `None` the
/// platform picks its default voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechOptions {
    /// Speaking rate multiplier (1.0 = platform default).
    pub rate: f32,
    /// Pitch multiplier (1.0 = platform default).
    pub pitch: Option<f32>,
    /// Engine-specific voice identifier.
    pub voice: Option<String>,
    /// Language-region tag such as `"en-US"`.
    pub language: Option<String>,
}

impl SpeechOptions {
    /// Rate only, everything else left to the platform.
    pub const fn minimal(rate: f32) -> Self {
        Self {
            rate,
            pitch: None,
            voice: None,
            language: None,
        }
    }
}

/// Terminal signal for one utterance: `Ok` when playback finished, `Err`
/// with the platform's reason otherwise.
pub type PlaybackSignal = Result<(), String>;

/// One-shot completion handle for a started utterance.
///
/// Consuming methods guarantee the signal is delivered at most once.
#[derive(Debug)]
pub struct PlaybackCompletion {
    tx: oneshot::Sender<PlaybackSignal>,
}

impl PlaybackCompletion {
    /// Create a completion handle and the receiver that observes it.
    pub fn channel() -> (Self, oneshot::Receiver<PlaybackSignal>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Playback finished normally.
    pub fn done(self) {
        let _ = self.tx.send(Ok(()));
    }

    /// Playback failed after it was started.
    pub fn failed(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(reason.into()));
    }

    /// Whether nobody is waiting for this utterance anymore.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    /// List the voices the platform offers.
    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SpeechEngineError>;

    /// Start speaking `text`.
    ///
    /// Returns once playback has been *started*; the outcome is reported
    /// through `completion`. A returned error means playback never started
    /// and `completion` has been dropped.
    fn speak(
        &self,
        text: &str,
        options: &SpeechOptions,
        completion: PlaybackCompletion,
    ) -> Result<(), SpeechEngineError>;

    /// Halt any playback immediately.
    fn stop(&self) -> Result<(), SpeechEngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completion_delivers_done() {
        let (completion, rx) = PlaybackCompletion::channel();
        completion.done();
        assert_eq!(rx.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn completion_delivers_failure_reason() {
        let (completion, rx) = PlaybackCompletion::channel();
        completion.failed("audio route lost");
        assert_eq!(rx.await.unwrap(), Err("audio route lost".to_string()));
    }

    #[test]
    fn completion_reports_abandonment() {
        let (completion, rx) = PlaybackCompletion::channel();
        assert!(!completion.is_abandoned());
        drop(rx);
        assert!(completion.is_abandoned());
    }

    #[test]
    fn minimal_options_leave_voice_to_platform() {
        let options = SpeechOptions::minimal(0.8);
        assert!(options.voice.is_none());
        assert!(options.language.is_none());
        assert!(options.pitch.is_none());
    }
}
