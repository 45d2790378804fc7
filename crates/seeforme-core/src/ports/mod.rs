//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the coordination core expects from the
//! device layer. They contain no implementation details and use only domain
//! types.
//!
//! # Design Rules
//!
//! - No camera, HTTP or process types in any signature
//! - Every port is `Send + Sync` so it can sit behind an `Arc<dyn _>`
//! - Each port carries its own error type; the core decides how to degrade

pub mod capture;
pub mod inference;
pub mod key_value;
pub mod speech_engine;

pub use capture::{CaptureError, CapturePort};
pub use inference::{EngineError, InferenceEnginePort};
pub use key_value::{InMemoryStore, KeyValueStore, StoreError};
pub use speech_engine::{
    PlaybackCompletion, PlaybackSignal, SpeechEngineError, SpeechEnginePort, SpeechOptions,
};
