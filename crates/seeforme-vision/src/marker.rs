//! Persisted "model already downloaded" marker.

use std::sync::Arc;

use seeforme_core::ports::{KeyValueStore, StoreError};
use tracing::warn;

const MARKER_PREFIX: &str = "seeforme_vision_model_downloaded_";
const MARKER_VALUE: &str = "true";

/// Store key for the download marker of `model_id`.
pub fn marker_key(model_id: &str) -> String {
    format!("{MARKER_PREFIX}{model_id}")
}

/// Write-once flag recording that a model's weights were fetched.
pub struct DownloadMarker {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl DownloadMarker {
    pub fn new(store: Arc<dyn KeyValueStore>, model_id: &str) -> Self {
        Self {
            store,
            key: marker_key(model_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the marker is present.
    ///
    /// A failed read counts as absent: re-downloading is wasteful but safe,
    /// trusting a marker we could not read is not.
    pub async fn is_set(&self) -> bool {
        match self.store.get(&self.key).await {
            Ok(value) => value.as_deref() == Some(MARKER_VALUE),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Could not read download marker; assuming absent");
                false
            }
        }
    }

    /// Record a successful download. Only call after the download reported success.
    pub async fn set(&self) -> Result<(), StoreError> {
        self.store.set(&self.key, MARKER_VALUE).await
    }
}
