//! Embedding provider for OpenAI-compatible `/v1/embeddings` endpoints.
//!
//! LM Studio, llama.cpp's server, Ollama and OpenAI itself all expose this
//! endpoint, so one client covers local and hosted embedding models.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::EmbeddingConfig;
use crate::embedding::{EmbeddingProvider, ensure_dimensions};
use crate::error::{RagError, Result};

const PROVIDER: &str = "openai-compatible";

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible embeddings API.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::{EmbeddingConfig, HttpEmbeddingProvider};
///
/// let provider = HttpEmbeddingProvider::new(EmbeddingConfig::default())?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    dimensions: usize,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpEmbeddingProvider {
    /// Create a provider from configuration.
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(RagError::Config("embedding model is required".to_string()));
        }
        if config.dimensions == 0 {
            return Err(RagError::Config("embedding dimensions must be greater than zero".into()));
        }
        if config.timeout.is_zero() {
            return Err(RagError::Config("embedding timeout must be non-zero".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
            model: config.model,
            dimensions: config.dimensions,
            api_key: config.api_key.filter(|key| !key.is_empty()),
            timeout: config.timeout,
        })
    }

    fn failure(message: String) -> RagError {
        RagError::Embedding { provider: PROVIDER.into(), message }
    }

    fn transport_error(&self, e: reqwest::Error) -> RagError {
        if e.is_timeout() {
            error!(provider = PROVIDER, url = %self.url, "embedding request timed out");
            RagError::EmbeddingTimeout { seconds: self.timeout.as_secs() }
        } else {
            error!(provider = PROVIDER, url = %self.url, error = %e, "request failed");
            RagError::EmbeddingUnavailable(e.to_string())
        }
    }
}

// ── Embeddings API request/response types ──────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Self::failure("API returned empty response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest { model: &self.model, input: texts.to_vec() };

        let mut request = self.client.post(&self.url).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(Self::failure(format!("API returned {status}: {detail}")));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let mut embedding_response: EmbeddingResponse =
            serde_json::from_str(&body).map_err(|e| {
                error!(provider = PROVIDER, error = %e, "failed to parse response");
                Self::failure(format!("failed to parse response: {e}"))
            })?;

        if embedding_response.data.len() != texts.len() {
            return Err(Self::failure(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        // Servers may return items out of order; `index` restores input order.
        embedding_response.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        let vectors: Vec<Vec<f32>> =
            embedding_response.data.into_iter().map(|d| d.embedding).collect();
        ensure_dimensions(&vectors, self.dimensions)?;
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
