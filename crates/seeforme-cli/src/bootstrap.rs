//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where adapters are wired into the
//! coordination core:
//! - Settings file + flags (via `seeforme-core` settings)
//! - Marker store (`JsonFileStore`)
//! - Vision session over llama-server (`seeforme-vision`)
//! - Speech coordinator over espeak-ng (`seeforme-speech`)
//! - Snapshot camera

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use seeforme_core::ports::{CapturePort, InferenceEnginePort, KeyValueStore, SpeechEnginePort};
use seeforme_core::settings::{Settings, SettingsUpdate, validate_settings};
use seeforme_scan::ScanConfig;
use seeforme_speech::{SpeechConfig, SpeechCoordinator};
use seeforme_vision::InferenceSession;
use tracing::{debug, info};

use crate::adapters::{
    EspeakEngine, JsonFileStore, LlamaServerConfig, LlamaServerEngine, SnapshotCapture,
};
use crate::error::CliError;
use crate::parser::Cli;
use crate::paths::{data_root, models_dir, settings_path, store_path};

/// Resolved configuration: where data lives and the effective settings.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub settings: Settings,
}

impl CliConfig {
    /// Load the settings file from the data directory and layer flags on top.
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let data_dir = data_root(cli.data_dir.as_deref())?;
        let mut settings = load_settings_file(&settings_path(&data_dir))?;
        settings.merge(&flag_overrides(cli));
        validate_settings(&settings)?;

        debug!(data_dir = %data_dir.display(), ?settings, "Configuration loaded");
        Ok(Self { data_dir, settings })
    }
}

/// Read settings from `path`; a missing file means defaults.
pub fn load_settings_file(path: &Path) -> Result<Settings, CliError> {
    if !path.exists() {
        return Ok(Settings::with_defaults());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
}

fn flag_overrides(cli: &Cli) -> SettingsUpdate {
    SettingsUpdate {
        model_id: cli.model.clone().map(Some),
        language: cli.language.clone().map(Some),
        speech_rate: cli.rate.map(Some),
        auto_speak: cli.auto_speak.then_some(Some(true)),
        server_url: cli.server_url.clone().map(Some),
        snapshot_path: cli
            .snapshot
            .as_ref()
            .map(|path| Some(path.display().to_string())),
        ..SettingsUpdate::default()
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub settings: Settings,
    pub session: Arc<InferenceSession>,
    pub speech: Arc<SpeechCoordinator>,
    pub capture: Arc<dyn CapturePort>,
}

impl CliContext {
    pub fn language(&self) -> &str {
        self.settings.effective_language()
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::from(&self.settings)
    }
}

/// Wire real adapters according to `config`.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext> {
    let settings = config.settings.clone();

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(store_path(&config.data_dir)));

    let engine: Arc<dyn InferenceEnginePort> = Arc::new(
        LlamaServerEngine::new(LlamaServerConfig {
            base_url: settings.effective_server_url().to_owned(),
            model_id: settings.effective_model_id().to_owned(),
            model_url: settings.model_url.clone(),
            models_dir: models_dir(&config.data_dir),
        })
        .context("Failed to create inference client")?,
    );
    let session = Arc::new(InferenceSession::new(
        engine,
        store,
        settings.effective_model_id(),
    ));

    let voice: Arc<dyn SpeechEnginePort> = Arc::new(EspeakEngine::new());
    let speech = Arc::new(SpeechCoordinator::new(voice, SpeechConfig::from(&settings)));

    let capture: Arc<dyn CapturePort> = Arc::new(SnapshotCapture::new(
        settings.snapshot_path.as_ref().map(PathBuf::from),
    ));

    info!(
        model = %settings.effective_model_id(),
        server = %settings.effective_server_url(),
        language = %settings.effective_language(),
        "Bootstrap complete"
    );

    Ok(CliContext {
        settings,
        session,
        speech,
        capture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let settings = load_settings_file(&temp.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::with_defaults());
    }

    #[test]
    fn malformed_settings_file_is_config_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();

        let err = load_settings_file(&path).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn flags_override_file_settings() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{"language":"German","speech_rate":1.5}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "seeforme",
            "--data-dir",
            temp.path().to_str().unwrap(),
            "--language",
            "Italian",
            "--snapshot",
            "/tmp/frame.jpg",
            "--auto-speak",
            "languages",
        ]);
        let config = CliConfig::load(&cli).unwrap();

        assert_eq!(config.settings.effective_language(), "Italian");
        assert!(config.settings.effective_auto_speak());
        assert_eq!(config.settings.speech_rate, Some(1.5));
        assert_eq!(config.settings.snapshot_path.as_deref(), Some("/tmp/frame.jpg"));
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "seeforme",
            "--data-dir",
            temp.path().to_str().unwrap(),
            "--rate",
            "9",
            "languages",
        ]);

        assert!(matches!(CliConfig::load(&cli), Err(CliError::Settings(_))));
    }

    #[tokio::test]
    async fn bootstrap_wires_an_uninitialized_session() {
        let temp = tempfile::tempdir().unwrap();
        let config = CliConfig {
            data_dir: temp.path().to_path_buf(),
            settings: Settings::with_defaults(),
        };

        let ctx = bootstrap(&config).unwrap();

        assert!(!ctx.session.is_ready());
        assert_eq!(ctx.session.model_id(), "lfm2-vl-450m");
        assert_eq!(ctx.language(), "English");
        assert!(!ctx.scan_config().auto_speak);
        assert!(!ctx.speech.is_speaking());
    }
}
