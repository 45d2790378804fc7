//! Speech playback coordination.
//!
//! [`SpeechCoordinator`] speaks text through a platform engine with
//! best-effort natural voice selection, a bounded wait for completion, and
//! clean cancellation via [`SpeechCoordinator::stop`].

pub mod coordinator;
pub mod error;
pub mod gate;
pub mod language;
pub mod voice;

// Re-export key types for convenience
pub use coordinator::{DEFAULT_SPEECH_TIMEOUT, SpeechConfig, SpeechCoordinator, SpeechOutcome};
pub use error::SpeechError;
pub use gate::PlaybackGate;
pub use language::{DEFAULT_LANGUAGE_TAG, language_tag, supported_languages};
pub use voice::{PREFERRED_VOICE_NAMES, VoiceSelection, select_voice};
