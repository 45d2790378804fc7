//! Inference session error types.

/// Errors returned by [`InferenceSession`](crate::InferenceSession).
///
/// `Clone` because one readiness failure is shared by every caller that
/// joined the same attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Download or initialization failed. A later `ensure_ready` retries.
    #[error("Vision model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single analysis failed. Not retried automatically.
    #[error("Scene analysis failed: {0}")]
    InferenceFailed(String),
}

impl SessionError {
    /// The underlying reason without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::ModelUnavailable(reason) | Self::InferenceFailed(reason) => reason,
        }
    }
}
