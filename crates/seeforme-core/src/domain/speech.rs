//! Speech-side domain types.

use serde::{Deserialize, Serialize};

/// A selectable synthesized voice as reported by the platform engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    /// Identifier the engine accepts when asked to use this voice.
    pub identifier: String,
    /// Human-readable name (e.g. `"Samantha"`).
    pub display_name: String,
    /// BCP-47 style tag (e.g. `"en-US"`).
    pub language_tag: String,
}

impl VoiceDescriptor {
    pub fn new(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        language_tag: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            language_tag: language_tag.into(),
        }
    }
}

/// Whether speech audio is currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Speaking,
}

impl PlaybackState {
    pub const fn is_speaking(self) -> bool {
        matches!(self, Self::Speaking)
    }
}
