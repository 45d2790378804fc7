//! Scan flow controller.
//!
//! [`ScanController`] is the only component that drives both the vision
//! session and the speech coordinator. It sequences capture, analysis and
//! speech, and restores the flow's invariants (no stale audio, no stale
//! result) at the start of every user action.

pub mod config;
pub mod controller;
pub mod event;

// Re-export key types for convenience
pub use config::ScanConfig;
pub use controller::{FALLBACK_DESCRIPTION, ScanController};
pub use event::{Rejection, ScanEvent, ScanOutcome, SpeakOutcome};
