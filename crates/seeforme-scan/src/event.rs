//! Events and action outcomes published by the controller.

use seeforme_core::domain::{AnalysisResult, CameraFacing, ScanState};
use seeforme_speech::{SpeechError, SpeechOutcome};

/// Events emitted by the scan controller to the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// Scan state changed.
    StateChanged(ScanState),

    /// The vision model is ready for scans.
    ModelReady,

    /// The vision model could not be brought up. Blocks scanning until a
    /// retry succeeds.
    InitializationFailed(String),

    /// The next scan will capture from this camera.
    CameraFlipped(CameraFacing),

    /// The camera produced no image; the flow is back to idle.
    CaptureFailed(String),

    /// Analysis failed and the fallback description was stored instead.
    AnalysisFailed(String),

    /// A description is available.
    ResultReady(String),

    /// Spoken playback of the description started.
    SpeakingStarted,

    /// Spoken playback settled (finished, timed out, stopped or failed).
    SpeakingFinished,

    /// Speech could not be produced. Dismissible.
    SpeechUnavailable(String),
}

/// Why an action was refused without any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("The controller has been torn down")]
    TornDown,

    #[error("A scan is already in progress")]
    Busy,

    #[error("The vision model is not ready")]
    ModelNotReady,

    #[error("There is no description to speak")]
    NoResult,
}

/// Result of [`ScanController::scan`](crate::ScanController::scan).
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// A description was stored (possibly the fallback text).
    Described(AnalysisResult),
    /// The camera failed; the flow returned to idle.
    CaptureFailed(String),
    /// A newer action or teardown superseded this scan; its result was discarded.
    Abandoned,
    Rejected(Rejection),
}

/// Result of [`ScanController::speak_again`](crate::ScanController::speak_again).
#[derive(Debug, Clone, PartialEq)]
pub enum SpeakOutcome {
    /// Playback ran and settled.
    Spoke(SpeechOutcome),
    /// Playback was in progress and has been stopped; the result is kept.
    Paused,
    Failed(SpeechError),
    Rejected(Rejection),
}
