use seeforme_core::domain::CaptureRequest;
use seeforme_core::settings::{DEFAULT_LANGUAGE, Settings};

/// Controller configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Language name the description is spoken in.
    pub language: String,

    /// Parameters passed to the camera for every scan.
    pub capture: CaptureRequest,

    /// Speak the description as soon as a scan produces it. When off, only
    /// `speak_again` starts playback.
    pub auto_speak: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            capture: CaptureRequest::default(),
            auto_speak: false,
        }
    }
}

impl From<&Settings> for ScanConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            language: settings.effective_language().to_owned(),
            capture: CaptureRequest {
                quality: settings.effective_capture_quality(),
                facing: settings.effective_camera_facing(),
            },
            auto_speak: settings.effective_auto_speak(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeforme_core::domain::CameraFacing;

    #[test]
    fn settings_flow_into_config() {
        let settings = Settings {
            language: Some("Korean".into()),
            capture_quality: Some(0.5),
            camera_facing: Some(CameraFacing::Front),
            auto_speak: Some(true),
            ..Settings::default()
        };

        let config = ScanConfig::from(&settings);
        assert_eq!(config.language, "Korean");
        assert!((config.capture.quality - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.capture.facing, CameraFacing::Front);
        assert!(config.auto_speak);
    }

    #[test]
    fn descriptions_wait_for_the_user_by_default() {
        assert!(!ScanConfig::default().auto_speak);
        assert!(!ScanConfig::from(&Settings::default()).auto_speak);
    }
}
