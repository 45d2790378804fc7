//! Inference engine port.
//!
//! The engine is treated as an opaque capability: fetch weights, load them,
//! and answer a prompt about an image. Lifecycle ordering (download before
//! init, init before complete) is enforced by `InferenceSession`, not here.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ImageHandle;

/// Errors reported by an inference engine adapter.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Model download failed: {0}")]
    Download(String),

    #[error("Model initialization failed: {0}")]
    Init(String),

    #[error("Completion failed: {0}")]
    Completion(String),
}

#[async_trait]
pub trait InferenceEnginePort: Send + Sync {
    /// Fetch the model weights. Must only report `Ok` once they are usable.
    async fn download(&self) -> Result<(), EngineError>;

    /// Load the (already downloaded) model.
    async fn init(&self) -> Result<(), EngineError>;

    /// Run one multimodal completion and return the raw model text.
    async fn complete(&self, prompt: &str, image: &ImageHandle) -> Result<String, EngineError>;
}
