//! Scan state machine states.

use serde::{Deserialize, Serialize};

/// Where the scan flow currently is.
///
/// ```text
///   Idle → Capturing → Analyzing → ResultReady
///    ▲         │                        │
///    └─────────┴──── (capture failed) ──┴── new scan
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScanState {
    /// No result, no audio, no in-flight work.
    #[default]
    Idle,
    /// Waiting for the camera to produce an image.
    Capturing,
    /// Waiting for the model to describe the image.
    Analyzing,
    /// A description (real or fallback) is available.
    ResultReady,
}

impl ScanState {
    /// Whether a capture or analysis is in flight.
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Capturing | Self::Analyzing)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Analyzing => "analyzing",
            Self::ResultReady => "result-ready",
        }
    }
}
