//! Speech coordination error types.

/// Errors returned by [`SpeechCoordinator`](crate::SpeechCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    /// Nothing to say. Callers normally check before speaking.
    #[error("Nothing to speak")]
    EmptyInput,

    /// Both the tuned and the minimal playback attempts failed.
    #[error("Speech service unavailable: {0}")]
    SpeechUnavailable(String),

    /// Playback started but the engine reported an error before finishing.
    #[error("Speech playback failed: {0}")]
    PlaybackFailed(String),

    /// The engine could not list its voices.
    #[error("Voice enumeration failed: {0}")]
    VoiceEnumerationFailed(String),
}
