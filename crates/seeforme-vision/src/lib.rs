//! Inference session for the on-device vision model.
//!
//! [`InferenceSession`] guarantees the model is downloaded and initialized
//! before use, collapses concurrent readiness requests into one attempt, and
//! serializes completions.

pub mod error;
pub mod marker;
pub mod prompt;
pub mod session;

// Re-export key types for convenience
pub use error::SessionError;
pub use marker::{DownloadMarker, marker_key};
pub use session::InferenceSession;
