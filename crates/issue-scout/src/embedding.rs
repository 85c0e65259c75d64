//! Embedding providers.
//!
//! - **[`OllamaEmbedder`]**: calls a local Ollama instance's `/api/embed` endpoint.
//! - **[`DisabledProvider`]**: placeholder that fails on use, for commands
//!   that never embed (`init`, `stats`).
//!
//! A batch that hits a rate limit (429), a server error (5xx) or an
//! unreachable server is sent again after a doubling pause, at most
//! `embedding.max_retries` times. Any other status fails the batch at once.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use issue_scout_core::embedding::EmbeddingProvider;

use crate::config::EmbeddingConfig;

/// Provider used when `embedding.provider = "disabled"`.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("Embedding provider is disabled; set embedding.provider = \"ollama\"")
    }
}

/// Issue embeddings from the Ollama server at `embedding.url`. The model has
/// to be pulled beforehand (`ollama pull mxbai-embed-large`).
pub struct OllamaEmbedder {
    client: reqwest::Client,
    model: String,
    dims: usize,
    url: String,
    max_retries: u32,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            model: config.model.clone(),
            dims: config.dims,
            url: config.url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Wait before retry number `attempt` (1-based): 1s, 2s, 4s, ... up to 32s.
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(5))
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn decode_embeddings(body: &[u8], expected: usize) -> Result<Vec<Vec<f32>>> {
    let parsed: EmbedResponse = serde_json::from_slice(body)
        .context("Ollama /api/embed returned an unexpected body")?;
    if parsed.embeddings.len() != expected {
        bail!(
            "Ollama returned {} embeddings for {} inputs",
            parsed.embeddings.len(),
            expected
        );
    }
    Ok(parsed.embeddings)
}

impl OllamaEmbedder {
    /// One POST to `/api/embed`. `Ok(Err(_))` marks a failure worth retrying.
    async fn attempt(&self, texts: &[String]) -> Result<Result<Vec<Vec<f32>>, anyhow::Error>> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };
        let response = match self
            .client
            .post(format!("{}/api/embed", self.url))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(Err(anyhow!(
                    "cannot reach Ollama at {} ({})",
                    self.url,
                    e
                )))
            }
        };

        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        if status.is_success() {
            return decode_embeddings(&body, texts.len()).map(Ok);
        }

        let failure = anyhow!(
            "Ollama embed failed with {}: {}",
            status,
            String::from_utf8_lossy(&body)
        );
        if is_transient(status) {
            Ok(Err(failure))
        } else {
            Err(failure)
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut attempt = 0;
        loop {
            match self.attempt(texts).await? {
                Ok(vectors) => return Ok(vectors),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = retry_delay(attempt);
                    warn!(attempt, delay_secs = delay.as_secs(), error = %e, "retrying embedding batch");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(e.context(format!(
                        "embedding failed after {} retries",
                        self.max_retries
                    )))
                }
            }
        }
    }
}

/// Build the provider named by `config.provider`.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}
