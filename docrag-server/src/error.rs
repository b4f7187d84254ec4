//! Mapping of pipeline failures onto HTTP responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docrag::RagError;
use thiserror::Error;
use tracing::{error, warn};

use crate::protocol::ErrorBody;

/// A failure on its way to the client.
///
/// The body carries a short message and a stable kind; the full error only
/// reaches the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The pipeline refused or failed the question.
    #[error(transparent)]
    Rag(#[from] RagError),
    /// The request body is not the expected JSON.
    #[error("invalid request body: {0}")]
    InvalidRequest(#[from] JsonRejection),
}

impl ApiError {
    /// Status code, machine-readable kind and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        let err = match self {
            Self::Rag(err) => err,
            Self::InvalidRequest(rejection) => {
                return (
                    rejection.status(),
                    "invalid_request",
                    "Request body must be a JSON object with a string \"question\".".to_string(),
                );
            }
        };
        match err {
            RagError::NotReady { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_ready",
                "RAG components are not loaded. Run ingestion first.".to_string(),
            ),
            RagError::InvalidQuestion(message) => {
                (StatusCode::BAD_REQUEST, "invalid_question", message.clone())
            }
            RagError::UpstreamUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "upstream_unavailable",
                "Could not connect to the language model server.".to_string(),
            ),
            RagError::UpstreamTimeout { seconds } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "upstream_timeout",
                format!("The language model server did not respond within {seconds}s."),
            ),
            RagError::UpstreamHttp { status, .. } => (
                StatusCode::BAD_GATEWAY,
                "upstream_http",
                format!("The language model server returned HTTP {status}."),
            ),
            RagError::UpstreamBadResponse(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream_bad_response",
                "Unexpected response format from the language model server.".to_string(),
            ),
            RagError::DimensionMismatch { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "dimension_mismatch",
                "The embedding model does not match the index. Re-run ingestion.".to_string(),
            ),
            RagError::EmbeddingUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "embedding_unavailable",
                "Could not connect to the embedding server.".to_string(),
            ),
            RagError::EmbeddingTimeout { seconds } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "embedding_timeout",
                format!("The embedding server did not respond within {seconds}s."),
            ),
            RagError::Embedding { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "embedding",
                "The question could not be embedded.".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "An internal server error occurred.".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, detail) = self.parts();
        if status.is_server_error() {
            error!(error = %self, kind, "request failed");
        } else {
            warn!(error = %self, kind, "request rejected");
        }
        (status, Json(ErrorBody { detail, kind: kind.to_string() })).into_response()
    }
}
