//! JSON bodies exchanged with HTTP clients.

use serde::{Deserialize, Serialize};

/// `POST /chat` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub question: String,
    /// Opaque client session identifier, recorded in logs only.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// `POST /chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated answer.
    pub answer: String,
    /// Texts of the chunks the answer was grounded on, in rank order.
    pub source: Vec<String>,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short user-facing message.
    pub detail: String,
    /// Stable machine-readable error kind.
    pub kind: String,
}
