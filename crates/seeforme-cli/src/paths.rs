//! Data directory resolution.
//!
//! Resolution order:
//! 1. `--data-dir` / `SEEFORME_DATA_DIR`
//! 2. System data directory (e.g. `~/.local/share/seeforme`)

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SEEFORME_DATA_DIR";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Could not determine the system data directory")]
    NoDataDir,

    #[error("Failed to create {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// Root directory for settings, the key-value store and downloaded weights.
///
/// `overridden` comes from the CLI flag (which already falls back to the
/// environment variable). The directory is created if missing.
pub fn data_root(overridden: Option<&Path>) -> Result<PathBuf, PathError> {
    let root = match overridden {
        Some(path) => path.to_path_buf(),
        None => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("seeforme"),
    };

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join("settings.json")
}

pub fn store_path(root: &Path) -> PathBuf {
    root.join("store.json")
}

/// Where downloaded model weights are kept.
pub fn models_dir(root: &Path) -> PathBuf {
    root.join("models")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_created_when_missing() {
        let temp = tempfile::tempdir().unwrap();
        let wanted = temp.path().join("nested").join("seeforme");

        let root = data_root(Some(&wanted)).unwrap();

        assert_eq!(root, wanted);
        assert!(root.is_dir());
    }

    #[test]
    fn files_live_under_root() {
        let root = Path::new("/data/seeforme");
        assert_eq!(settings_path(root), root.join("settings.json"));
        assert_eq!(store_path(root), root.join("store.json"));
        assert_eq!(models_dir(root), root.join("models"));
    }
}
