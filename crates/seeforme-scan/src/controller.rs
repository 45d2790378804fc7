//! `ScanController`: the scan flow state machine.
//!
//! ```text
//!   Idle ──scan──→ Capturing ──→ Analyzing ──→ ResultReady
//!    ▲                 │                           │  │
//!    ├── capture fail ─┘                           │  └─ speak_again (toggle)
//!    └──────────────────── new_scan ───────────────┘
//! ```
//!
//! Every action goes through [`begin`](ScanController::begin), which refuses
//! work after teardown and silences the previous action's audio. Each
//! `scan`, `new_scan` or `teardown` bumps `epoch`; a scan that finishes under
//! an older epoch discards its result.
//!
//! Speech is claimed under the state lock before it starts: the claim records
//! a pending announcement and takes the speech stop token, so an action that
//! begins before the audio is audible still cancels it.
//!
//! State lives behind a std mutex that is never held across an `.await`, so
//! each transition between suspension points is atomic.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use seeforme_core::domain::{
    AnalysisRequest, AnalysisResult, CameraFacing, CaptureRequest, ScanState,
};
use seeforme_core::ports::CapturePort;
use seeforme_speech::SpeechCoordinator;
use seeforme_vision::{InferenceSession, SessionError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::event::{Rejection, ScanEvent, ScanOutcome, SpeakOutcome};

/// Stored in place of a description when analysis fails.
pub const FALLBACK_DESCRIPTION: &str = "Unable to analyze the scene. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Scan,
    SpeakAgain,
    NewScan,
}

#[derive(Debug, Default)]
struct FlowState {
    scan: ScanState,
    result: Option<AnalysisResult>,
    facing: CameraFacing,
    epoch: u64,
    /// Id of the utterance claimed but not yet settled.
    announcement: Option<u64>,
    announcements: u64,
    torn_down: bool,
}

/// A claimed utterance: its id and the stop token it is bound to.
struct Announcement {
    id: u64,
    token: CancellationToken,
}

pub struct ScanController {
    session: Arc<InferenceSession>,
    speech: Arc<SpeechCoordinator>,
    capture: Arc<dyn CapturePort>,
    config: ScanConfig,
    state: Mutex<FlowState>,
    event_tx: mpsc::UnboundedSender<ScanEvent>,
}

impl ScanController {
    /// Create a controller and the receiver for its events.
    pub fn new(
        session: Arc<InferenceSession>,
        speech: Arc<SpeechCoordinator>,
        capture: Arc<dyn CapturePort>,
        config: ScanConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = FlowState {
            facing: config.capture.facing,
            ..FlowState::default()
        };
        let controller = Self {
            session,
            speech,
            capture,
            config,
            state: Mutex::new(state),
            event_tx,
        };
        (controller, event_rx)
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn state(&self) -> ScanState {
        self.lock_state().scan
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        self.lock_state().result.clone()
    }

    /// Camera the next scan captures from.
    pub fn facing(&self) -> CameraFacing {
        self.lock_state().facing
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    /// Whether the vision model is ready for scans.
    pub fn is_initialized(&self) -> bool {
        self.session.is_ready()
    }

    pub fn is_torn_down(&self) -> bool {
        self.lock_state().torn_down
    }

    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    // ── Actions ────────────────────────────────────────────────────

    /// Bring the vision model up. Safe to call again after a failure.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        match self.session.ensure_ready().await {
            Ok(()) => {
                info!(model = %self.session.model_id(), "Scanner ready");
                self.emit(ScanEvent::ModelReady);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Scanner initialization failed");
                self.emit(ScanEvent::InitializationFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Capture a frame, describe it, and (when configured) speak the result.
    pub async fn scan(&self) -> ScanOutcome {
        let (epoch, request) = {
            let mut state = self.lock_state();
            if let Err(rejection) = self.begin(&mut state, Action::Scan) {
                debug!(%rejection, "Scan rejected");
                return ScanOutcome::Rejected(rejection);
            }
            state.epoch += 1;
            state.result = None;
            self.set_state(&mut state, ScanState::Capturing);
            let request = CaptureRequest {
                facing: state.facing,
                ..self.config.capture
            };
            (state.epoch, request)
        };

        let image = match self.capture.capture(&request).await {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Capture failed");
                let mut state = self.lock_state();
                if !Self::is_current(&state, epoch) {
                    return ScanOutcome::Abandoned;
                }
                self.set_state(&mut state, ScanState::Idle);
                self.emit(ScanEvent::CaptureFailed(e.to_string()));
                return ScanOutcome::CaptureFailed(e.to_string());
            }
        };

        {
            let mut state = self.lock_state();
            if !Self::is_current(&state, epoch) {
                debug!(%image, "Scan abandoned after capture");
                return ScanOutcome::Abandoned;
            }
            self.set_state(&mut state, ScanState::Analyzing);
        }

        let result = match self.session.analyze(AnalysisRequest::describe(image)).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Analysis failed, storing fallback description");
                self.emit(ScanEvent::AnalysisFailed(e.to_string()));
                AnalysisResult::new(FALLBACK_DESCRIPTION)
            }
        };

        let announcement = {
            let mut state = self.lock_state();
            if !Self::is_current(&state, epoch) {
                debug!("Scan abandoned after analysis, discarding result");
                return ScanOutcome::Abandoned;
            }
            state.result = Some(result.clone());
            self.set_state(&mut state, ScanState::ResultReady);
            self.emit(ScanEvent::ResultReady(result.description.clone()));

            (self.config.auto_speak && has_words(&result.description))
                .then(|| self.claim_announcement(&mut state))
        };

        if let Some(announcement) = announcement {
            self.speak_description(&result.description, announcement).await;
        }

        ScanOutcome::Described(result)
    }

    /// Replay the description, or stop it if it is currently playing.
    pub async fn speak_again(&self) -> SpeakOutcome {
        let (description, announcement) = {
            let mut state = self.lock_state();
            if let Err(rejection) = self.begin(&mut state, Action::SpeakAgain) {
                debug!(%rejection, "Speak rejected");
                return SpeakOutcome::Rejected(rejection);
            }

            if state.announcement.take().is_some() || self.speech.is_speaking() {
                self.speech.stop();
                debug!("Playback paused, result kept");
                return SpeakOutcome::Paused;
            }

            let description = match state.result.as_ref() {
                Some(result) if has_words(&result.description) => result.description.clone(),
                _ => return SpeakOutcome::Rejected(Rejection::NoResult),
            };
            (description, self.claim_announcement(&mut state))
        };

        self.speak_description(&description, announcement).await
    }

    /// Switch between the back and front camera. Takes effect at the next
    /// capture.
    pub fn flip_camera(&self) -> Result<CameraFacing, Rejection> {
        let mut state = self.lock_state();
        if state.torn_down {
            return Err(Rejection::TornDown);
        }

        state.facing = state.facing.toggled();
        info!(facing = ?state.facing, "Camera flipped");
        self.emit(ScanEvent::CameraFlipped(state.facing));
        Ok(state.facing)
    }

    /// Drop the current result and go back to idle, abandoning any scan in
    /// flight.
    pub fn new_scan(&self) -> Result<(), Rejection> {
        let mut state = self.lock_state();
        self.begin(&mut state, Action::NewScan)?;

        state.epoch += 1;
        state.result = None;
        self.set_state(&mut state, ScanState::Idle);
        Ok(())
    }

    /// Stop audio, abandon in-flight work, and refuse every later action.
    pub fn teardown(&self) {
        let mut state = self.lock_state();
        if state.torn_down {
            return;
        }

        state.torn_down = true;
        state.epoch += 1;
        state.result = None;
        state.announcement = None;
        self.speech.stop();
        self.set_state(&mut state, ScanState::Idle);
        info!("Scan controller torn down");
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Guarded entry for every user action: refuses work after teardown,
    /// applies the action's preconditions, then silences leftover audio
    /// before the action touches anything else.
    fn begin(&self, state: &mut FlowState, action: Action) -> Result<(), Rejection> {
        if state.torn_down {
            return Err(Rejection::TornDown);
        }

        match action {
            Action::Scan => {
                if state.scan.is_busy() {
                    return Err(Rejection::Busy);
                }
                if !self.session.is_ready() {
                    return Err(Rejection::ModelNotReady);
                }
            }
            Action::SpeakAgain => {
                if state.scan != ScanState::ResultReady {
                    return Err(Rejection::NoResult);
                }
                // The toggle decides what to do with playing audio.
                return Ok(());
            }
            Action::NewScan => {}
        }

        if state.announcement.take().is_some() || self.speech.is_speaking() {
            debug!(?action, "Stopping previous audio");
            self.speech.stop();
        }
        Ok(())
    }

    /// Reserve the next utterance. Any audio still playing is stopped first so
    /// the claimed token is the fresh one.
    fn claim_announcement(&self, state: &mut FlowState) -> Announcement {
        if self.speech.is_speaking() {
            self.speech.stop();
        }
        state.announcements += 1;
        state.announcement = Some(state.announcements);
        Announcement {
            id: state.announcements,
            token: self.speech.stop_token(),
        }
    }

    async fn speak_description(
        &self,
        description: &str,
        announcement: Announcement,
    ) -> SpeakOutcome {
        self.emit(ScanEvent::SpeakingStarted);
        let outcome = self
            .speech
            .speak_until(description, &self.config.language, announcement.token)
            .await;
        {
            let mut state = self.lock_state();
            if state.announcement == Some(announcement.id) {
                state.announcement = None;
            }
        }
        self.emit(ScanEvent::SpeakingFinished);

        match outcome {
            Ok(outcome) => SpeakOutcome::Spoke(outcome),
            Err(e) => {
                warn!(error = %e, "Speech unavailable");
                self.emit(ScanEvent::SpeechUnavailable(e.to_string()));
                SpeakOutcome::Failed(e)
            }
        }
    }

    fn is_current(state: &FlowState, epoch: u64) -> bool {
        !state.torn_down && state.epoch == epoch
    }

    fn set_state(&self, state: &mut FlowState, next: ScanState) {
        if state.scan != next {
            debug!(old = state.scan.label(), new = next.label(), "Scan state transition");
            state.scan = next;
            self.emit(ScanEvent::StateChanged(next));
        }
    }

    /// Emit an event. A dropped receiver is not an error.
    fn emit(&self, event: ScanEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Scan event receiver dropped");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn has_words(description: &str) -> bool {
    !description.trim().is_empty()
}

impl Drop for ScanController {
    fn drop(&mut self) {
        self.teardown();
    }
}
