//! `InferenceEnginePort` over an OpenAI-compatible llama-server.
//!
//! - `download` streams model weights into the data directory when a weights
//!   URL is configured; otherwise the server is expected to manage its own.
//! - `init` polls `/health` until the server answers.
//! - `complete` posts one chat completion with the image inlined as a
//!   base64 data URL.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use seeforme_core::domain::ImageHandle;
use seeforme_core::ports::{EngineError, InferenceEnginePort};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::uri_path;

const HEALTH_ATTEMPTS: u32 = 30;
const HEALTH_INTERVAL: Duration = Duration::from_secs(1);
const MAX_TOKENS: u32 = 512;

/// Connection settings for [`LlamaServerEngine`].
#[derive(Debug, Clone)]
pub struct LlamaServerConfig {
    /// Base URL, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    pub model_id: String,
    /// Optional weights URL fetched on first run.
    pub model_url: Option<String>,
    /// Where fetched weights are stored.
    pub models_dir: PathBuf,
}

pub struct LlamaServerEngine {
    client: Client,
    config: LlamaServerConfig,
}

impl LlamaServerEngine {
    pub fn new(config: LlamaServerConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| EngineError::Init(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn check_health(&self) -> bool {
        match self
            .client
            .get(self.endpoint("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    async fn fetch_weights(&self, url: &str, dest: &Path) -> Result<(), EngineError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", "seeforme")
            .send()
            .await
            .map_err(download_err)?;
        if !response.status().is_success() {
            return Err(EngineError::Download(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(download_err)?;
        }

        let partial = dest.with_extension("part");
        let total = response.content_length().unwrap_or(0);
        let downloaded = stream_to_file(response.bytes_stream(), &partial).await?;

        if let Err(e) = tokio::fs::rename(&partial, dest).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(download_err(e));
        }

        info!(path = %dest.display(), bytes = downloaded, expected = total, "Model weights downloaded");
        Ok(())
    }
}

#[async_trait]
impl InferenceEnginePort for LlamaServerEngine {
    async fn download(&self) -> Result<(), EngineError> {
        let Some(url) = self.config.model_url.as_deref() else {
            debug!(model = %self.config.model_id, "No weights URL configured, server manages weights");
            return Ok(());
        };

        let dest = self
            .config
            .models_dir
            .join(weights_file_name(url, &self.config.model_id));
        info!(url, dest = %dest.display(), "Fetching model weights");
        self.fetch_weights(url, &dest).await
    }

    async fn init(&self) -> Result<(), EngineError> {
        for attempt in 1..=HEALTH_ATTEMPTS {
            if self.check_health().await {
                info!(url = %self.config.base_url, "Inference server is ready");
                return Ok(());
            }
            debug!(attempt, "Inference server not ready yet");
            tokio::time::sleep(HEALTH_INTERVAL).await;
        }

        Err(EngineError::Init(format!(
            "no healthy server at {} after {HEALTH_ATTEMPTS} attempts",
            self.config.base_url
        )))
    }

    async fn complete(&self, prompt: &str, image: &ImageHandle) -> Result<String, EngineError> {
        let path = uri_path(image.uri());
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| EngineError::Completion(format!("{}: {e}", path.display())))?;

        let request = ChatRequest::vision(
            &self.config.model_id,
            prompt,
            image_data_url(&path, &bytes),
        );

        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Completion(format!("HTTP {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Completion(format!("invalid response: {e}")))?;
        body.into_text()
    }
}

/// Write every chunk of `stream` to `partial`, returning the byte count.
///
/// On any failure the partial file is removed before the error is returned.
async fn stream_to_file<S, B, E>(mut stream: S, partial: &Path) -> Result<u64, EngineError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(download_err)?;

    let written = async {
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(download_err)?;
            let bytes = chunk.as_ref();
            file.write_all(bytes).await.map_err(download_err)?;
            downloaded += bytes.len() as u64;
        }
        file.flush().await.map_err(download_err)?;
        Ok::<_, EngineError>(downloaded)
    }
    .await;
    drop(file);

    if let Err(e) = &written {
        warn!(path = %partial.display(), error = %e, "Weights download interrupted, removing partial file");
        let _ = tokio::fs::remove_file(partial).await;
    }
    written
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

impl ChatRequest {
    fn vision(model: &str, prompt: &str, image_url: String) -> Self {
        Self {
            model: model.to_owned(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                    ContentPart::Text {
                        text: prompt.to_owned(),
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, EngineError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| EngineError::Completion("response contained no choices".into()))
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn download_err(e: impl Display) -> EngineError {
    EngineError::Download(e.to_string())
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn image_data_url(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", image_mime(path), BASE64.encode(bytes))
}

/// Last path segment of the weights URL, or `<model_id>.gguf`.
fn weights_file_name(url: &str, model_id: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("{model_id}.gguf"), str::to_owned)
}
