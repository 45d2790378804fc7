//! Best-effort natural voice selection.
//!
//! Given the voices a platform offers and a target language tag:
//!
//! 1. a voice in the same base language whose name is on the curated
//!    natural-sounding list,
//! 2. else any voice in the same base language,
//! 3. else no voice, only the language tag,
//! 4. else (nothing enumerable) neither, and the platform decides.

use seeforme_core::domain::VoiceDescriptor;
use seeforme_core::ports::SpeechOptions;

use crate::language::base_subtag;

/// Voice names that tend to sound natural across platforms, best first.
pub const PREFERRED_VOICE_NAMES: &[&str] =
    &["Siri", "Nova", "Allison", "Samantha", "Alex", "Victoria"];

/// Outcome of [`select_voice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    /// Same language and on the curated list.
    Preferred(VoiceDescriptor),
    /// Same language, not curated.
    Compatible(VoiceDescriptor),
    /// Voices exist but none speak the language; pass the tag only.
    LanguageOnly(String),
    /// No voices could be enumerated.
    PlatformDefault,
}

impl VoiceSelection {
    /// Fill `voice` and `language` on `options` according to this selection.
    pub fn apply(&self, options: &mut SpeechOptions) {
        options.voice = self.voice().map(|voice| voice.identifier.clone());
        options.language = match self {
            Self::LanguageOnly(tag) => Some(tag.clone()),
            _ => self.voice().map(|voice| voice.language_tag.clone()),
        };
    }

    pub fn voice(&self) -> Option<&VoiceDescriptor> {
        match self {
            Self::Preferred(voice) | Self::Compatible(voice) => Some(voice),
            Self::LanguageOnly(_) | Self::PlatformDefault => None,
        }
    }
}

/// Pick a voice for `language_tag` out of `voices`.
pub fn select_voice(voices: &[VoiceDescriptor], language_tag: &str) -> VoiceSelection {
    if voices.is_empty() {
        return VoiceSelection::PlatformDefault;
    }

    let base = base_subtag(language_tag);
    let same_language: Vec<&VoiceDescriptor> = voices
        .iter()
        .filter(|voice| base_subtag(&voice.language_tag).eq_ignore_ascii_case(base))
        .collect();

    for preferred in PREFERRED_VOICE_NAMES {
        if let Some(voice) = same_language
            .iter()
            .find(|voice| display_name_matches(&voice.display_name, preferred))
        {
            return VoiceSelection::Preferred((*voice).clone());
        }
    }

    same_language.first().map_or_else(
        || VoiceSelection::LanguageOnly(language_tag.to_owned()),
        |voice| VoiceSelection::Compatible((*voice).clone()),
    )
}

/// Platforms decorate names ("Samantha (Enhanced)", "en-us-nova"), so match
/// on containment rather than equality.
fn display_name_matches(display_name: &str, preferred: &str) -> bool {
    display_name
        .to_ascii_lowercase()
        .contains(&preferred.to_ascii_lowercase())
}
