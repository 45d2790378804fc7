//! Playback gate: tracks whether an utterance is audible.
//!
//! Every `speak` call takes a fresh [`UtteranceId`] when it opens the gate.
//! Only the utterance that currently owns the gate may close it on settle, so
//! a stale utterance that settles late (after `stop` and a newer `speak`)
//! cannot flip the state back to idle underneath the newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use seeforme_core::domain::PlaybackState;

/// Zero is reserved for "nobody is speaking".
const SILENT: u64 = 0;

/// Identifies one `speak` call for the lifetime of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtteranceId(u64);

/// Shared playback flag, cheap to clone.
#[derive(Debug, Clone)]
pub struct PlaybackGate {
    current: Arc<AtomicU64>,
    next_id: Arc<AtomicU64>,
}

impl PlaybackGate {
    /// Create a new gate (initially silent).
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(SILENT)),
            next_id: Arc::new(AtomicU64::new(SILENT + 1)),
        }
    }

    /// Mark a new utterance as speaking, superseding any previous one.
    pub fn open(&self) -> UtteranceId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.current.store(id, Ordering::SeqCst);
        tracing::debug!(utterance = id, "Playback gate: speaking");
        UtteranceId(id)
    }

    /// Close the gate on behalf of `utterance`.
    ///
    /// Returns `false` (and leaves the gate untouched) when a newer utterance
    /// owns it or it is already closed.
    pub fn settle(&self, utterance: UtteranceId) -> bool {
        let closed = self
            .current
            .compare_exchange(utterance.0, SILENT, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if closed {
            tracing::debug!(utterance = utterance.0, "Playback gate: idle");
        }
        closed
    }

    /// Force the gate closed regardless of owner.
    pub fn close(&self) {
        self.current.store(SILENT, Ordering::SeqCst);
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        if self.current.load(Ordering::SeqCst) == SILENT {
            PlaybackState::Idle
        } else {
            PlaybackState::Speaking
        }
    }

    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.state().is_speaking()
    }
}

impl Default for PlaybackGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_default_is_idle() {
        let gate = PlaybackGate::new();
        assert_eq!(gate.state(), PlaybackState::Idle);
    }

    #[test]
    fn gate_open_settle() {
        let gate = PlaybackGate::new();

        let id = gate.open();
        assert!(gate.is_speaking());

        assert!(gate.settle(id));
        assert!(!gate.is_speaking());
    }

    #[test]
    fn stale_utterance_cannot_close_newer_one() {
        let gate = PlaybackGate::new();

        let first = gate.open();
        let second = gate.open();

        assert!(!gate.settle(first));
        assert!(gate.is_speaking());

        assert!(gate.settle(second));
        assert!(!gate.is_speaking());
    }

    #[test]
    fn close_then_settle_is_noop() {
        let gate = PlaybackGate::new();
        let id = gate.open();
        gate.close();
        assert!(!gate.settle(id));
        assert_eq!(gate.state(), PlaybackState::Idle);
    }

    #[test]
    fn gate_clone_shares_state() {
        let gate1 = PlaybackGate::new();
        let gate2 = gate1.clone();

        let id = gate1.open();
        assert!(gate2.is_speaking());

        gate2.settle(id);
        assert!(!gate1.is_speaking());
    }
}
