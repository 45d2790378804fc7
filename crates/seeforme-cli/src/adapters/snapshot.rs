//! `CapturePort` that reads the camera frame from a file.
//!
//! Anything that keeps writing the latest frame to a path (a webcam
//! snapshot daemon, a phone sync folder) can act as the viewfinder.

use std::path::PathBuf;

use async_trait::async_trait;
use seeforme_core::domain::{CaptureRequest, ImageHandle};
use seeforme_core::ports::{CaptureError, CapturePort};
use tracing::debug;

use super::file_uri;

pub struct SnapshotCapture {
    path: Option<PathBuf>,
}

impl SnapshotCapture {
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CapturePort for SnapshotCapture {
    async fn capture(&self, request: &CaptureRequest) -> Result<ImageHandle, CaptureError> {
        let path = self.path.as_ref().ok_or_else(|| {
            CaptureError::Unavailable("no snapshot path configured (use --snapshot)".into())
        })?;

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CaptureError::NoImage);
            }
            Err(e) => return Err(CaptureError::Device(e.to_string())),
        };
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(CaptureError::NoImage);
        }

        debug!(
            path = %path.display(),
            quality = request.quality,
            facing = ?request.facing,
            "Snapshot captured"
        );
        Ok(ImageHandle::new(file_uri(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_snapshot_becomes_file_handle() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("frame.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let capture = SnapshotCapture::new(Some(path.clone()));
        let handle = capture.capture(&CaptureRequest::default()).await.unwrap();

        assert_eq!(handle.uri(), file_uri(&path));
    }

    #[tokio::test]
    async fn missing_or_empty_snapshot_is_no_image() {
        let temp = tempfile::tempdir().unwrap();
        let missing = SnapshotCapture::new(Some(temp.path().join("absent.jpg")));
        assert!(matches!(
            missing.capture(&CaptureRequest::default()).await,
            Err(CaptureError::NoImage)
        ));

        let empty_path = temp.path().join("empty.jpg");
        std::fs::write(&empty_path, b"").unwrap();
        let empty = SnapshotCapture::new(Some(empty_path));
        assert!(matches!(
            empty.capture(&CaptureRequest::default()).await,
            Err(CaptureError::NoImage)
        ));
    }

    #[tokio::test]
    async fn unconfigured_camera_is_unavailable() {
        let capture = SnapshotCapture::new(None);
        assert!(matches!(
            capture.capture(&CaptureRequest::default()).await,
            Err(CaptureError::Unavailable(_))
        ));
    }
}
