//! Configuration for ingestion, retrieval and generation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default window length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// Configuration parameters for chunking and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved for each question.
    pub top_k: usize,
    /// Number of chunk texts sent to the embedder per request during ingestion.
    pub embed_batch_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            embed_batch_size: 32,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set how many texts are embedded per request during ingestion.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.config.embed_batch_size = size;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `embed_batch_size == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.embed_batch_size == 0 {
            return Err(RagError::Config("embed_batch_size must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

/// Locations of the two persisted artifacts produced by ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Binary flat vector index.
    pub index_path: PathBuf,
    /// JSON chunk list, index-aligned with the vectors.
    pub corpus_path: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("vector_index.bin"),
            corpus_path: PathBuf::from("chunks.json"),
        }
    }
}

/// Request/response shape spoken by the generation service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WireProtocol {
    /// `messages` in, `choices[0].message.content` out.
    #[default]
    Chat,
    /// `prompt` in, `choices[0].text` out.
    Completion,
}

impl WireProtocol {
    /// The conventional endpoint path for this protocol.
    pub fn default_path(self) -> &'static str {
        match self {
            Self::Chat => "/v1/chat/completions",
            Self::Completion => "/v1/completions",
        }
    }
}

impl fmt::Display for WireProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => f.write_str("chat"),
            Self::Completion => f.write_str("completion"),
        }
    }
}

impl FromStr for WireProtocol {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "completion" | "completions" | "legacy" => Ok(Self::Completion),
            other => Err(RagError::Config(format!(
                "unknown wire protocol '{other}' (expected 'chat' or 'completion')"
            ))),
        }
    }
}

/// Settings for the external completion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Scheme, host and port, e.g. `http://localhost:1234`.
    pub base_url: String,
    /// Request/response shape.
    pub protocol: WireProtocol,
    /// Overrides the protocol's conventional path when set.
    pub endpoint_path: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token budget, sent only by the completion protocol.
    pub max_tokens: u32,
    /// Maximum wait for a single completion call.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234".to_string(),
            protocol: WireProtocol::Chat,
            endpoint_path: None,
            model: "local-model".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }
}

impl GenerationConfig {
    /// Full URL of the completion endpoint.
    pub fn endpoint_url(&self) -> String {
        let path = self.endpoint_path.as_deref().unwrap_or(self.protocol.default_path());
        join_url(&self.base_url, path)
    }

    /// Check that the configuration can produce a usable client.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(RagError::Config("generation base_url is required".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(RagError::Config("generation model is required".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(RagError::Config("generation timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Settings for the OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Scheme, host and port of the embeddings server.
    pub base_url: String,
    /// Path of the embeddings endpoint.
    pub endpoint_path: String,
    /// Embedding model identifier.
    pub model: String,
    /// Length of the vectors the model produces.
    pub dimensions: usize,
    /// Bearer token, when the server requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Maximum wait for a single embeddings call.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234".to_string(),
            endpoint_path: "/v1/embeddings".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl EmbeddingConfig {
    /// Full URL of the embeddings endpoint.
    pub fn endpoint_url(&self) -> String {
        join_url(&self.base_url, &self.endpoint_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
