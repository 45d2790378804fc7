//! Camera capture port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CaptureRequest, ImageHandle};

/// Why a capture produced no image.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The camera finished but handed back nothing usable.
    #[error("No image was captured")]
    NoImage,

    /// The camera is not available (permission, busy, unmounted).
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    /// Any other device-level failure.
    #[error("Capture failed: {0}")]
    Device(String),
}

/// Produces an image handle on request.
#[async_trait]
pub trait CapturePort: Send + Sync {
    async fn capture(&self, request: &CaptureRequest) -> Result<ImageHandle, CaptureError>;
}
