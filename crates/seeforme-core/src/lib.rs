//! Core domain types and port definitions for the seeforme scan pipeline.
//!
//! This crate has no knowledge of cameras, model runtimes or speech
//! synthesizers. It defines the shapes that cross the boundary between the
//! coordination core (`seeforme-vision`, `seeforme-speech`, `seeforme-scan`)
//! and the adapters that talk to real devices.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AnalysisRequest, AnalysisResult, CameraFacing, CaptureRequest, ImageHandle, ModelReadiness,
    PlaybackState, ScanState, VoiceDescriptor,
};
pub use ports::{
    CaptureError, CapturePort, EngineError, InMemoryStore, InferenceEnginePort, KeyValueStore,
    PlaybackCompletion, SpeechEngineError, SpeechEnginePort, SpeechOptions, StoreError,
};
pub use settings::{
    DEFAULT_LANGUAGE, DEFAULT_MODEL_ID, DEFAULT_SERVER_URL, Settings, SettingsError,
    SettingsUpdate, validate_settings,
};

#[cfg(test)]
use serde_json as _;
