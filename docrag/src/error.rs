//! Error types for the `docrag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in ingestion and question answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// The index, corpus or embedder is not loaded. Ingestion must run first.
    #[error("RAG components are not loaded: {reason}")]
    NotReady {
        /// Why the service could not be made ready.
        reason: String,
    },

    /// A vector's length does not match the index dimension.
    #[error("dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the stored vectors.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// The generation service could not be reached.
    #[error("generation service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The generation service did not answer within the configured timeout.
    #[error("generation service timed out after {seconds}s")]
    UpstreamTimeout {
        /// The configured timeout in seconds.
        seconds: u64,
    },

    /// The generation service answered with a non-2xx status.
    #[error("generation service returned {status}: {detail}")]
    UpstreamHttp {
        /// The HTTP status code.
        status: u16,
        /// The error detail reported by the service, if any.
        detail: String,
    },

    /// The generation service answered 2xx with a body in an unexpected shape.
    #[error("unexpected response from generation service: {0}")]
    UpstreamBadResponse(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The embeddings service could not be reached.
    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The embeddings service did not answer within the configured timeout.
    #[error("embedding service timed out after {seconds}s")]
    EmbeddingTimeout {
        /// The configured timeout in seconds.
        seconds: u64,
    },

    /// Text could not be extracted from a source document.
    #[error("failed to extract text from {}: {message}", path.display())]
    Extraction {
        /// The document that failed.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// Invalid chunking parameters.
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The question was empty or otherwise unusable.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    /// A persisted artifact is unreadable or inconsistent with its partner.
    #[error("corrupt artifact: {0}")]
    CorruptArtifact(String),

    /// Ingestion found nothing to index.
    #[error("no documents to index: {0}")]
    NoDocuments(String),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RagError {
    /// Whether this error originates from the generation service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable(_)
                | Self::UpstreamTimeout { .. }
                | Self::UpstreamHttp { .. }
                | Self::UpstreamBadResponse(_)
        )
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
