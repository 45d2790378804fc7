//! Integration tests for the `InferenceSession` readiness lifecycle.
//!
//! These tests drive the session through download / init / analyze using a
//! scripted engine and an instrumented store. No model files or network
//! access are required.
//!
//! # What is tested
//!
//! - Concurrent `ensure_ready` callers collapse into one download and init
//! - The download marker skips the download and is written only on success
//! - Failed attempts surface `ModelUnavailable`, land in `Failed`, and retry
//! - `analyze` readies the model lazily, picks the right prompt, cleans output
//! - Engine errors during analysis become `InferenceFailed`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use seeforme_core::domain::{AnalysisRequest, ImageHandle, ModelReadiness};
use seeforme_core::ports::{
    EngineError, InMemoryStore, InferenceEnginePort, KeyValueStore, StoreError,
};
use seeforme_vision::{InferenceSession, SessionError, marker_key};

const MODEL: &str = "test-vl";

// ── Mock engine ────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedEngine {
    downloads: AtomicUsize,
    inits: AtomicUsize,
    completions: AtomicUsize,
    fail_download: AtomicBool,
    fail_init: AtomicBool,
    fail_complete: AtomicBool,
    response: Mutex<String>,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedEngine {
    fn replying(text: &str) -> Arc<Self> {
        let engine = Self::default();
        *engine.response.lock().unwrap() = text.to_owned();
        Arc::new(engine)
    }

    fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceEnginePort for ScriptedEngine {
    async fn download(&self) -> Result<(), EngineError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        // Long enough for every concurrent caller to join the attempt.
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail_download.load(Ordering::SeqCst) {
            return Err(EngineError::Download("connection reset".into()));
        }
        Ok(())
    }

    async fn init(&self) -> Result<(), EngineError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(EngineError::Init("out of memory".into()));
        }
        Ok(())
    }

    async fn complete(&self, prompt: &str, _image: &ImageHandle) -> Result<String, EngineError> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_owned());
        if self.fail_complete.load(Ordering::SeqCst) {
            return Err(EngineError::Completion("context overflow".into()));
        }
        Ok(self.response.lock().unwrap().clone())
    }
}

// ── Instrumented store ─────────────────────────────────────────────

#[derive(Default)]
struct CountingStore {
    inner: InMemoryStore,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("corrupt store".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}

fn session_with(engine: &Arc<ScriptedEngine>, store: &Arc<CountingStore>) -> InferenceSession {
    InferenceSession::new(engine.clone(), store.clone(), MODEL)
}

fn image() -> ImageHandle {
    ImageHandle::new("file:///tmp/scene.jpg")
}

// ── Readiness ──────────────────────────────────────────────────────

#[tokio::test]
async fn starts_uninitialized() {
    let engine = ScriptedEngine::replying("");
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    assert_eq!(session.readiness(), ModelReadiness::Uninitialized);
    assert!(!session.is_ready());
    assert_eq!(session.model_id(), MODEL);
}

#[tokio::test]
async fn concurrent_ensure_ready_downloads_once() {
    let engine = ScriptedEngine::replying("");
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    let (a, b, c) = tokio::join!(
        session.ensure_ready(),
        session.ensure_ready(),
        session.ensure_ready()
    );

    assert_eq!(a, Ok(()));
    assert_eq!(b, Ok(()));
    assert_eq!(c, Ok(()));
    assert_eq!(engine.downloads(), 1);
    assert_eq!(engine.inits(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    assert_eq!(session.readiness(), ModelReadiness::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ensure_ready_across_tasks_downloads_once() {
    let engine = ScriptedEngine::replying("");
    let store = Arc::new(CountingStore::default());
    let session = Arc::new(session_with(&engine, &store));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.ensure_ready().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    assert_eq!(engine.downloads(), 1);
    assert_eq!(engine.inits(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ensure_ready_is_idempotent_once_ready() {
    let engine = ScriptedEngine::replying("");
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    session.ensure_ready().await.unwrap();
    session.ensure_ready().await.unwrap();

    assert_eq!(engine.downloads(), 1);
    assert_eq!(engine.inits(), 1);
}

#[tokio::test]
async fn marker_present_skips_download() {
    let engine = ScriptedEngine::replying("");
    let store = Arc::new(CountingStore::default());
    store.inner.set(&marker_key(MODEL), "true").await.unwrap();
    let session = session_with(&engine, &store);

    session.ensure_ready().await.unwrap();

    assert_eq!(engine.downloads(), 0);
    assert_eq!(engine.inits(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreadable_marker_counts_as_absent() {
    let engine = ScriptedEngine::replying("");
    let store = Arc::new(CountingStore::default());
    store.fail_reads.store(true, Ordering::SeqCst);
    let session = session_with(&engine, &store);

    session.ensure_ready().await.unwrap();

    assert_eq!(engine.downloads(), 1);
    assert!(session.is_ready());
}

#[tokio::test]
async fn download_failure_leaves_marker_unset_and_retries() {
    let engine = ScriptedEngine::replying("");
    engine.fail_download.store(true, Ordering::SeqCst);
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    let err = session.ensure_ready().await.unwrap_err();
    assert!(
        matches!(err, SessionError::ModelUnavailable(ref reason) if reason.contains("connection reset")),
        "expected ModelUnavailable, got {err:?}"
    );
    assert!(matches!(session.readiness(), ModelReadiness::Failed(_)));
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    assert_eq!(store.inner.peek(&marker_key(MODEL)), None);
    assert_eq!(engine.inits(), 0);

    // Network recovers: the next call starts a fresh attempt.
    engine.fail_download.store(false, Ordering::SeqCst);
    session.ensure_ready().await.unwrap();

    assert_eq!(engine.downloads(), 2);
    assert_eq!(engine.inits(), 1);
    assert_eq!(store.inner.peek(&marker_key(MODEL)).as_deref(), Some("true"));
    assert_eq!(session.readiness(), ModelReadiness::Ready);
}

#[tokio::test]
async fn init_failure_keeps_marker_and_retry_skips_download() {
    let engine = ScriptedEngine::replying("");
    engine.fail_init.store(true, Ordering::SeqCst);
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    let err = session.ensure_ready().await.unwrap_err();
    assert!(matches!(err, SessionError::ModelUnavailable(_)));
    assert_eq!(
        session.readiness(),
        ModelReadiness::Failed("Model initialization failed: out of memory".into())
    );
    assert_eq!(store.inner.peek(&marker_key(MODEL)).as_deref(), Some("true"));

    engine.fail_init.store(false, Ordering::SeqCst);
    session.ensure_ready().await.unwrap();

    assert_eq!(engine.downloads(), 1);
    assert_eq!(engine.inits(), 2);
}

#[tokio::test]
async fn concurrent_callers_share_one_failure() {
    let engine = ScriptedEngine::replying("");
    engine.fail_download.store(true, Ordering::SeqCst);
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    let (a, b) = tokio::join!(session.ensure_ready(), session.ensure_ready());

    assert!(a.is_err());
    assert_eq!(a, b);
    assert_eq!(engine.downloads(), 1);
}

#[tokio::test]
async fn subscriber_sees_final_phase() {
    let engine = ScriptedEngine::replying("");
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);
    let mut readiness = session.subscribe();

    session.ensure_ready().await.unwrap();

    assert!(readiness.has_changed().unwrap());
    assert_eq!(*readiness.borrow_and_update(), ModelReadiness::Ready);
}

// ── Analysis ───────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_readies_model_lazily_and_cleans_output() {
    let engine = ScriptedEngine::replying("  A kitchen with a blue kettle.<|im_end|>\n");
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    let result = session
        .analyze(AnalysisRequest::describe(image()))
        .await
        .unwrap();

    assert_eq!(result.description, "A kitchen with a blue kettle.");
    assert!(session.is_ready());
    assert_eq!(engine.downloads(), 1);

    let prompt = engine.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.starts_with("Describe what you see in this image"));
}

#[tokio::test]
async fn analyze_with_question_uses_question_prompt() {
    let engine = ScriptedEngine::replying("Three.");
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    session
        .analyze(AnalysisRequest::ask(image(), "How many chairs?"))
        .await
        .unwrap();

    let prompt = engine.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("answer the following question: \"How many chairs?\""));
}

#[tokio::test]
async fn analyze_engine_error_is_inference_failed() {
    let engine = ScriptedEngine::replying("unused");
    engine.fail_complete.store(true, Ordering::SeqCst);
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    let err = session
        .analyze(AnalysisRequest::describe(image()))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SessionError::InferenceFailed("Completion failed: context overflow".into())
    );
    // The model itself is still fine.
    assert!(session.is_ready());
    assert_eq!(engine.completions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn analyze_propagates_readiness_failure() {
    let engine = ScriptedEngine::replying("unused");
    engine.fail_init.store(true, Ordering::SeqCst);
    let store = Arc::new(CountingStore::default());
    let session = session_with(&engine, &store);

    let err = session
        .analyze(AnalysisRequest::describe(image()))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::ModelUnavailable(_)));
    assert_eq!(engine.completions.load(Ordering::SeqCst), 0);
}
