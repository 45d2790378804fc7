//! `InferenceSession`: lifecycle owner for the vision model.
//!
//! # Readiness
//!
//! ```text
//!   Uninitialized ──→ Downloading ──→ Initializing ──→ Ready
//!         │    (marker present) ────────↗    │
//!         └──────────────→ Failed(reason) ←──┘
//! ```
//!
//! The first `ensure_ready` call starts a readiness attempt and parks it in
//! `in_flight` as a shared future. Every caller that arrives while it runs
//! awaits that same future, so download and init run once per attempt no
//! matter how many callers pile up. The attempt removes itself from
//! `in_flight` when it settles; after a failure the next caller starts a
//! fresh attempt.
//!
//! # Analysis
//!
//! Completions are serialized by `analyze_lock`: a second `analyze` queues
//! behind the first rather than hitting the engine concurrently.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture, Shared};
use seeforme_core::domain::{AnalysisRequest, AnalysisResult, ModelReadiness};
use seeforme_core::ports::{InferenceEnginePort, KeyValueStore};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, error, info, warn};

use crate::error::SessionError;
use crate::marker::DownloadMarker;
use crate::prompt::{build_prompt, clean_response};

type ReadinessAttempt = Shared<BoxFuture<'static, Result<(), SessionError>>>;

/// Process-wide handle to the vision model.
///
/// Construct one at startup and share it via `Arc`.
pub struct InferenceSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    model_id: String,
    engine: Arc<dyn InferenceEnginePort>,
    marker: DownloadMarker,
    readiness: watch::Sender<ModelReadiness>,
    /// Readiness attempt currently running, if any.
    /// Std lock: only held for slot swaps, never across an `.await`.
    in_flight: Mutex<Option<ReadinessAttempt>>,
    analyze_lock: AsyncMutex<()>,
}

impl InferenceSession {
    pub fn new(
        engine: Arc<dyn InferenceEnginePort>,
        store: Arc<dyn KeyValueStore>,
        model_id: impl Into<String>,
    ) -> Self {
        let model_id = model_id.into();
        let (readiness, _) = watch::channel(ModelReadiness::Uninitialized);

        Self {
            inner: Arc::new(SessionInner {
                marker: DownloadMarker::new(store, &model_id),
                model_id,
                engine,
                readiness,
                in_flight: Mutex::new(None),
                analyze_lock: AsyncMutex::new(()),
            }),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.inner.model_id
    }

    /// Current readiness phase.
    pub fn readiness(&self) -> ModelReadiness {
        self.inner.readiness.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.readiness.borrow().is_ready()
    }

    /// Watch readiness transitions (e.g. to drive a loading screen).
    pub fn subscribe(&self) -> watch::Receiver<ModelReadiness> {
        self.inner.readiness.subscribe()
    }

    /// Make sure the model is downloaded and initialized.
    ///
    /// Returns immediately when already `Ready`. Concurrent callers share one
    /// attempt and all observe its outcome.
    pub async fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.is_ready() {
            return Ok(());
        }
        self.readiness_attempt().await
    }

    /// Describe the image in `request`, answering its question if it has one.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, SessionError> {
        self.ensure_ready().await?;

        let _turn = self.inner.analyze_lock.lock().await;

        let prompt = build_prompt(request.question());
        debug!(
            image = %request.image(),
            has_question = request.question().is_some(),
            "Submitting scene analysis"
        );

        let raw = self
            .inner
            .engine
            .complete(&prompt, request.image())
            .await
            .map_err(|e| {
                error!(model = %self.inner.model_id, error = %e, "Scene analysis failed");
                SessionError::InferenceFailed(e.to_string())
            })?;

        debug!(raw_len = raw.len(), "Raw model response received");
        Ok(AnalysisResult::new(clean_response(&raw)))
    }

    /// Join the running readiness attempt or start a new one.
    fn readiness_attempt(&self) -> ReadinessAttempt {
        let mut slot = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(attempt) = slot.as_ref() {
            debug!(model = %self.inner.model_id, "Joining in-flight readiness attempt");
            return attempt.clone();
        }

        // An attempt may have finished between the caller's fast-path check
        // and taking the slot lock.
        if self.is_ready() {
            return future::ready(Ok::<(), SessionError>(())).boxed().shared();
        }

        let inner = Arc::clone(&self.inner);
        let attempt = async move { inner.bring_up().await }.boxed().shared();
        *slot = Some(attempt.clone());
        attempt
    }
}

impl SessionInner {
    /// Run one readiness attempt to completion and publish its outcome.
    async fn bring_up(&self) -> Result<(), SessionError> {
        let outcome = self.download_and_init().await;

        match &outcome {
            Ok(()) => {
                self.set_readiness(ModelReadiness::Ready);
                info!(model = %self.model_id, "Vision model ready");
            }
            Err(e) => {
                self.set_readiness(ModelReadiness::Failed(e.reason().to_owned()));
                error!(model = %self.model_id, error = %e, "Vision model failed to become ready");
            }
        }

        // Readiness is published before the slot is cleared so a caller that
        // finds the slot empty also finds the final phase.
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        outcome
    }

    async fn download_and_init(&self) -> Result<(), SessionError> {
        if self.marker.is_set().await {
            debug!(model = %self.model_id, "Download marker present, skipping download");
        } else {
            self.set_readiness(ModelReadiness::Downloading);
            info!(model = %self.model_id, "Downloading vision model");

            self.engine
                .download()
                .await
                .map_err(|e| SessionError::ModelUnavailable(e.to_string()))?;

            if let Err(e) = self.marker.set().await {
                warn!(
                    key = %self.marker.key(),
                    error = %e,
                    "Model downloaded but marker could not be persisted; next start will re-download"
                );
            }
        }

        self.set_readiness(ModelReadiness::Initializing);
        info!(model = %self.model_id, "Initializing vision model");

        self.engine
            .init()
            .await
            .map_err(|e| SessionError::ModelUnavailable(e.to_string()))
    }

    fn set_readiness(&self, next: ModelReadiness) {
        let previous = self.readiness.send_replace(next);
        debug!(
            model = %self.model_id,
            from = previous.label(),
            to = self.readiness.borrow().label(),
            "Readiness transition"
        );
    }
}
