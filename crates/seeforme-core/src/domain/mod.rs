//! Domain types shared by the session, speech and scan layers.

mod scan;
mod speech;
mod vision;

pub use scan::ScanState;
pub use speech::{PlaybackState, VoiceDescriptor};
pub use vision::{
    AnalysisRequest, AnalysisResult, CameraFacing, CaptureRequest, ImageHandle, ModelReadiness,
};
