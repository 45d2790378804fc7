//! Concrete port implementations wired by the bootstrap.

pub mod espeak;
pub mod file_store;
pub mod llama_server;
pub mod snapshot;

pub use espeak::EspeakEngine;
pub use file_store::JsonFileStore;
pub use llama_server::{LlamaServerConfig, LlamaServerEngine};
pub use snapshot::SnapshotCapture;

use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Image handle URI for a local file.
pub fn file_uri(path: &Path) -> String {
    format!("{FILE_SCHEME}{}", path.display())
}

/// Local path behind an image handle URI. Bare paths are accepted as-is.
pub fn uri_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
}
