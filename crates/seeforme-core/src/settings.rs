//! Settings domain types and validation.
//!
//! These are pure domain types with no infrastructure dependencies. The CLI
//! host loads them from a JSON file and layers flags on top.

use serde::{Deserialize, Serialize};

use crate::domain::CameraFacing;

/// Vision model used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "lfm2-vl-450m";

/// Language name used for speech when none is configured.
pub const DEFAULT_LANGUAGE: &str = "English";

/// OpenAI-compatible inference server used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

const DEFAULT_SPEECH_RATE: f32 = 0.8;
const DEFAULT_SPEECH_PITCH: f32 = 1.0;
const DEFAULT_SPEECH_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CAPTURE_QUALITY: f32 = 0.8;
const DEFAULT_AUTO_SPEAK: bool = false;

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Identifier of the vision model (also keys the download marker).
    pub model_id: Option<String>,

    /// Language name used to pick a speech voice (e.g. `"Spanish"`).
    pub language: Option<String>,

    /// Speaking rate multiplier (0.1–2.0). Slower than 1.0 aids comprehension.
    pub speech_rate: Option<f32>,

    /// Pitch multiplier (0.5–2.0).
    pub speech_pitch: Option<f32>,

    /// Upper bound on how long one utterance may wait for completion.
    pub speech_timeout_secs: Option<u64>,

    /// Speak each description as soon as a scan produces it. Off by default:
    /// playback starts only when the user asks for it.
    pub auto_speak: Option<bool>,

    /// Capture encoder quality (0.0–1.0).
    pub capture_quality: Option<f32>,

    /// Which camera to capture from.
    pub camera_facing: Option<CameraFacing>,

    /// Base URL of the inference server.
    pub server_url: Option<String>,

    /// Where to fetch model weights from on first run, if the server does not
    /// manage them itself.
    pub model_url: Option<String>,

    /// Image file the capture adapter treats as the camera viewfinder.
    pub snapshot_path: Option<String>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            model_id: Some(DEFAULT_MODEL_ID.to_owned()),
            language: Some(DEFAULT_LANGUAGE.to_owned()),
            speech_rate: Some(DEFAULT_SPEECH_RATE),
            speech_pitch: Some(DEFAULT_SPEECH_PITCH),
            speech_timeout_secs: Some(DEFAULT_SPEECH_TIMEOUT_SECS),
            auto_speak: Some(DEFAULT_AUTO_SPEAK),
            capture_quality: Some(DEFAULT_CAPTURE_QUALITY),
            camera_facing: Some(CameraFacing::Back),
            server_url: Some(DEFAULT_SERVER_URL.to_owned()),
            model_url: None,
            snapshot_path: None,
        }
    }

    #[must_use]
    pub fn effective_model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_MODEL_ID)
    }

    #[must_use]
    pub fn effective_language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    #[must_use]
    pub fn effective_speech_rate(&self) -> f32 {
        self.speech_rate.unwrap_or(DEFAULT_SPEECH_RATE)
    }

    #[must_use]
    pub fn effective_speech_pitch(&self) -> f32 {
        self.speech_pitch.unwrap_or(DEFAULT_SPEECH_PITCH)
    }

    #[must_use]
    pub fn effective_speech_timeout_secs(&self) -> u64 {
        self.speech_timeout_secs
            .unwrap_or(DEFAULT_SPEECH_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn effective_auto_speak(&self) -> bool {
        self.auto_speak.unwrap_or(DEFAULT_AUTO_SPEAK)
    }

    #[must_use]
    pub fn effective_capture_quality(&self) -> f32 {
        self.capture_quality.unwrap_or(DEFAULT_CAPTURE_QUALITY)
    }

    #[must_use]
    pub fn effective_camera_facing(&self) -> CameraFacing {
        self.camera_facing.unwrap_or_default()
    }

    #[must_use]
    pub fn effective_server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Merge an update into this one, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref model_id) = other.model_id {
            self.model_id.clone_from(model_id);
        }
        if let Some(ref language) = other.language {
            self.language.clone_from(language);
        }
        if let Some(rate) = other.speech_rate {
            self.speech_rate = rate;
        }
        if let Some(pitch) = other.speech_pitch {
            self.speech_pitch = pitch;
        }
        if let Some(timeout) = other.speech_timeout_secs {
            self.speech_timeout_secs = timeout;
        }
        if let Some(auto_speak) = other.auto_speak {
            self.auto_speak = auto_speak;
        }
        if let Some(quality) = other.capture_quality {
            self.capture_quality = quality;
        }
        if let Some(facing) = other.camera_facing {
            self.camera_facing = facing;
        }
        if let Some(ref url) = other.server_url {
            self.server_url.clone_from(url);
        }
        if let Some(ref url) = other.model_url {
            self.model_url.clone_from(url);
        }
        if let Some(ref path) = other.snapshot_path {
            self.snapshot_path.clone_from(path);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub model_id: Option<Option<String>>,
    pub language: Option<Option<String>>,
    pub speech_rate: Option<Option<f32>>,
    pub speech_pitch: Option<Option<f32>>,
    pub speech_timeout_secs: Option<Option<u64>>,
    pub auto_speak: Option<Option<bool>>,
    pub capture_quality: Option<Option<f32>>,
    pub camera_facing: Option<Option<CameraFacing>>,
    pub server_url: Option<Option<String>>,
    pub model_url: Option<Option<String>>,
    pub snapshot_path: Option<Option<String>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Speech rate must be between 0.1 and 2.0, got {0}")]
    InvalidSpeechRate(f32),

    #[error("Speech pitch must be between 0.5 and 2.0, got {0}")]
    InvalidSpeechPitch(f32),

    #[error("Speech timeout must be between 1 and 3600 seconds, got {0}")]
    InvalidSpeechTimeout(u64),

    #[error("Capture quality must be between 0.0 and 1.0, got {0}")]
    InvalidCaptureQuality(f32),

    #[error("Model id cannot be empty")]
    EmptyModelId,

    #[error("Server URL must start with http:// or https://, got {0}")]
    InvalidServerUrl(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(rate) = settings.speech_rate {
        if !(0.1..=2.0).contains(&rate) {
            return Err(SettingsError::InvalidSpeechRate(rate));
        }
    }

    if let Some(pitch) = settings.speech_pitch {
        if !(0.5..=2.0).contains(&pitch) {
            return Err(SettingsError::InvalidSpeechPitch(pitch));
        }
    }

    if let Some(timeout) = settings.speech_timeout_secs {
        if !(1..=3600).contains(&timeout) {
            return Err(SettingsError::InvalidSpeechTimeout(timeout));
        }
    }

    if let Some(quality) = settings.capture_quality {
        if !(0.0..=1.0).contains(&quality) {
            return Err(SettingsError::InvalidCaptureQuality(quality));
        }
    }

    if let Some(ref model_id) = settings.model_id {
        if model_id.trim().is_empty() {
            return Err(SettingsError::EmptyModelId);
        }
    }

    if let Some(ref url) = settings.server_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidServerUrl(url.clone()));
        }
    }

    Ok(())
}
