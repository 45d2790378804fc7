//! `SpeechCoordinator`: one utterance at a time, always settling.
//!
//! Each `speak` call races three things and takes whichever resolves first:
//!
//! ```text
//!   cancellation token ─┐
//!   engine completion  ─┼─→ SpeechOutcome
//!   safety timeout     ─┘
//! ```
//!
//! `stop` swaps in a fresh token and cancels the old one, so every pending
//! `speak` resolves as [`SpeechOutcome::Stopped`] while later calls start
//! clean. Starting playback and stopping it take the same lock, so a `stop`
//! can never slip between a `speak`'s cancellation check and the engine call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use seeforme_core::domain::{PlaybackState, VoiceDescriptor};
use seeforme_core::ports::{
    PlaybackCompletion, PlaybackSignal, SpeechEngineError, SpeechEnginePort, SpeechOptions,
};
use seeforme_core::settings::Settings;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::SpeechError;
use crate::gate::PlaybackGate;
use crate::language::language_tag;
use crate::voice::select_voice;

/// Upper bound on waiting for an engine that never reports completion.
pub const DEFAULT_SPEECH_TIMEOUT: Duration = Duration::from_secs(120);

/// Playback tuning shared by every utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    /// Rate multiplier; slower than 1.0 aids comprehension.
    pub rate: f32,
    pub pitch: f32,
    pub timeout: Duration,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: 0.8,
            pitch: 1.0,
            timeout: DEFAULT_SPEECH_TIMEOUT,
        }
    }
}

impl From<&Settings> for SpeechConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            rate: settings.effective_speech_rate(),
            pitch: settings.effective_speech_pitch(),
            timeout: Duration::from_secs(settings.effective_speech_timeout_secs()),
        }
    }
}

/// How a successful `speak` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// The engine reported the end of playback.
    Completed,
    /// The engine stayed silent past the timeout; audio is assumed finished.
    TimedOut,
    /// `stop` was called before playback ended.
    Stopped,
}

pub struct SpeechCoordinator {
    engine: Arc<dyn SpeechEnginePort>,
    config: SpeechConfig,
    gate: PlaybackGate,
    /// Token for the current generation of utterances. Also serializes
    /// starting playback against `stop`; never held across an `.await`.
    cancel: Mutex<CancellationToken>,
}

impl SpeechCoordinator {
    pub fn new(engine: Arc<dyn SpeechEnginePort>, config: SpeechConfig) -> Self {
        Self {
            engine,
            config,
            gate: PlaybackGate::new(),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub const fn config(&self) -> &SpeechConfig {
        &self.config
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.gate.state()
    }

    pub fn is_speaking(&self) -> bool {
        self.gate.is_speaking()
    }

    /// Voices the engine offers.
    pub async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SpeechError> {
        self.engine
            .list_voices()
            .await
            .map_err(|e| SpeechError::VoiceEnumerationFailed(e.to_string()))
    }

    /// Speak `text` in `language` (a language name such as `"Spanish"`).
    ///
    /// Resolves exactly once: when the engine reports completion, when the
    /// safety timeout fires, or when [`stop`](Self::stop) is called.
    pub async fn speak(&self, text: &str, language: &str) -> Result<SpeechOutcome, SpeechError> {
        let token = self.stop_token();
        self.speak_until(text, language, token).await
    }

    /// Like [`speak`](Self::speak), but bound to a token taken earlier with
    /// [`stop_token`](Self::stop_token). A `stop` issued after the token was
    /// taken wins even if this call has not started yet.
    pub async fn speak_until(
        &self,
        text: &str,
        language: &str,
        token: CancellationToken,
    ) -> Result<SpeechOutcome, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyInput);
        }
        if token.is_cancelled() {
            debug!("Utterance stopped before it started");
            return Ok(SpeechOutcome::Stopped);
        }

        let utterance = self.gate.open();

        let options = self.resolve_options(language).await;
        let outcome = self.play(text, &options, &token).await;

        self.gate.settle(utterance);
        match &outcome {
            Ok(SpeechOutcome::Completed) => debug!("Utterance completed"),
            Ok(SpeechOutcome::TimedOut) => warn!(
                timeout_secs = self.config.timeout.as_secs(),
                "Speech engine never reported completion, assuming playback finished"
            ),
            Ok(SpeechOutcome::Stopped) => debug!("Utterance stopped"),
            Err(e) => error!(error = %e, "Utterance failed"),
        }
        outcome
    }

    /// The token the next [`stop`](Self::stop) cancels.
    pub fn stop_token(&self) -> CancellationToken {
        self.lock_token().clone()
    }

    /// Halt playback now. Every in-flight `speak` resolves as `Stopped`.
    /// Safe to call when idle.
    pub fn stop(&self) {
        let mut current = self.lock_token();
        let previous = std::mem::replace(&mut *current, CancellationToken::new());
        previous.cancel();

        if let Err(e) = self.engine.stop() {
            warn!(error = %e, "Speech engine failed to stop");
        }
        self.gate.close();
        info!("Speech stopped");
    }

    /// Options for one utterance: tuned rate and pitch plus the best voice
    /// the engine has for `language`.
    pub async fn resolve_options(&self, language: &str) -> SpeechOptions {
        let tag = language_tag(language);
        let voices = match self.engine.list_voices().await {
            Ok(voices) => voices,
            Err(e) => {
                warn!(error = %e, "Could not enumerate voices, using platform default");
                Vec::new()
            }
        };

        let selection = select_voice(&voices, tag);
        debug!(language, tag, ?selection, "Voice selected");

        let mut options = SpeechOptions {
            rate: self.config.rate,
            pitch: Some(self.config.pitch),
            voice: None,
            language: None,
        };
        selection.apply(&mut options);
        options
    }

    /// Start playback with `options`, falling back once to rate-only options
    /// if the engine rejects them.
    async fn play(
        &self,
        text: &str,
        options: &SpeechOptions,
        token: &CancellationToken,
    ) -> Result<SpeechOutcome, SpeechError> {
        match self.start(text, options, token) {
            Ok(Some(completion)) => self
                .await_settle(completion, token)
                .await
                .map_err(SpeechError::PlaybackFailed),
            Ok(None) => Ok(SpeechOutcome::Stopped),
            Err(e) => {
                warn!(error = %e, "Speech setup failed, retrying with minimal options");
                let minimal = SpeechOptions::minimal(self.config.rate);
                match self.start(text, &minimal, token) {
                    Ok(Some(completion)) => self
                        .await_settle(completion, token)
                        .await
                        .map_err(SpeechError::SpeechUnavailable),
                    Ok(None) => Ok(SpeechOutcome::Stopped),
                    Err(e) => Err(SpeechError::SpeechUnavailable(e.to_string())),
                }
            }
        }
    }

    /// Hand the utterance to the engine unless `token` was already cancelled.
    fn start(
        &self,
        text: &str,
        options: &SpeechOptions,
        token: &CancellationToken,
    ) -> Result<Option<oneshot::Receiver<PlaybackSignal>>, SpeechEngineError> {
        let _current = self.lock_token();
        if token.is_cancelled() {
            return Ok(None);
        }

        let (completion, receiver) = PlaybackCompletion::channel();
        self.engine.speak(text, options, completion)?;
        Ok(Some(receiver))
    }

    async fn await_settle(
        &self,
        completion: oneshot::Receiver<PlaybackSignal>,
        token: &CancellationToken,
    ) -> Result<SpeechOutcome, String> {
        tokio::select! {
            biased;

            () = token.cancelled() => Ok(SpeechOutcome::Stopped),

            signal = completion => match signal {
                Ok(Ok(())) => Ok(SpeechOutcome::Completed),
                Ok(Err(reason)) => Err(reason),
                Err(_) => Err("speech engine dropped the utterance without reporting".to_owned()),
            },

            () = tokio::time::sleep(self.config.timeout) => Ok(SpeechOutcome::TimedOut),
        }
    }

    fn lock_token(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SpeechCoordinator {
    fn drop(&mut self) {
        if self.gate.is_speaking() {
            self.stop();
        }
    }
}
