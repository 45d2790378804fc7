//! Vision-side domain types: model readiness, capture and analysis payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the on-device vision model.
///
/// ```text
///   Uninitialized → Downloading → Initializing → Ready
///          │              │              │
///          └──────────────┴──────────────┴──→ Failed(reason) ──→ (retry)
/// ```
///
/// `Downloading` is skipped when the persisted download marker is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", content = "reason", rename_all = "camelCase")]
pub enum ModelReadiness {
    /// Nothing has been attempted yet.
    #[default]
    Uninitialized,
    /// Model weights are being fetched.
    Downloading,
    /// Weights are on disk; the engine is loading them.
    Initializing,
    /// The engine accepts completions.
    Ready,
    /// The last readiness attempt failed.
    Failed(String),
}

impl ModelReadiness {
    /// Whether the model can serve completions right now.
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Short lowercase label for logs and status lines.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Downloading => "downloading",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Opaque handle to a captured image.
///
/// The core never looks inside; the capture adapter produces it and the
/// inference adapter knows how to resolve it (file path, content URI, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn uri(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which physical camera to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    /// The opposite camera.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front => Self::Back,
        }
    }
}

/// Parameters handed to the capture collaborator for one shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
    pub facing: CameraFacing,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            quality: 0.8,
            facing: CameraFacing::Back,
        }
    }
}

/// One request to describe an image, optionally answering a question about it.
///
/// Fields are private so a request cannot change after it has been issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    image: ImageHandle,
    question: Option<String>,
}

impl AnalysisRequest {
    /// A plain "describe the scene" request.
    pub const fn describe(image: ImageHandle) -> Self {
        Self {
            image,
            question: None,
        }
    }

    /// A request that asks the model a specific question about the image.
    pub fn ask(image: ImageHandle, question: impl Into<String>) -> Self {
        Self {
            image,
            question: Some(question.into()),
        }
    }

    pub const fn image(&self) -> &ImageHandle {
        &self.image
    }

    /// The question, if one was given and it is not blank.
    pub fn question(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Text produced by one successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub description: String,
}

impl AnalysisResult {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_question_is_treated_as_absent() {
        let image = ImageHandle::new("file:///tmp/shot.jpg");
        assert_eq!(AnalysisRequest::ask(image.clone(), "   ").question(), None);
        assert_eq!(AnalysisRequest::describe(image.clone()).question(), None);
        assert_eq!(
            AnalysisRequest::ask(image, " what colour is the car? ").question(),
            Some("what colour is the car?")
        );
    }

    #[test]
    fn readiness_labels_and_predicates() {
        assert!(ModelReadiness::Ready.is_ready());
        assert!(!ModelReadiness::Failed("boom".into()).is_ready());
        assert_eq!(ModelReadiness::Downloading.label(), "downloading");
        assert_eq!(ModelReadiness::default(), ModelReadiness::Uninitialized);
        assert_eq!(ModelReadiness::Failed("x".into()).label(), "failed");
    }

    #[test]
    fn readiness_serializes_with_reason() {
        let json = serde_json::to_string(&ModelReadiness::Failed("disk full".into())).unwrap();
        assert_eq!(json, r#"{"phase":"failed","reason":"disk full"}"#);
    }

    #[test]
    fn camera_toggle_flips() {
        assert_eq!(CameraFacing::Back.toggled(), CameraFacing::Front);
        assert_eq!(CameraFacing::Front.toggled().toggled(), CameraFacing::Front);
    }
}
