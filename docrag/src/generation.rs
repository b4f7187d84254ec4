//! Client for the external completion service.
//!
//! Speaks one of two OpenAI-style wire shapes, fixed at construction by
//! [`WireProtocol`]:
//!
//! - chat: `{model, messages, temperature, stream}` → `choices[0].message.content`
//! - completion: `{model, prompt, max_tokens, temperature, stream}` → `choices[0].text`
//!
//! A body that does not match the configured shape is an
//! [`RagError::UpstreamBadResponse`]; the other shape is never tried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{GenerationConfig, WireProtocol};
use crate::error::{RagError, Result};

/// Something that turns a prompt into answer text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate the answer for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// HTTP client for an OpenAI-compatible completion endpoint.
///
/// One attempt per call; no retries. Every call is bounded by the configured
/// timeout.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: reqwest::Client,
    url: String,
    config: GenerationConfig,
}

impl GenerationClient {
    /// Create a client from configuration.
    pub fn new(config: GenerationConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;
        let url = config.endpoint_url();
        info!(%url, protocol = %config.protocol, model = %config.model, "generation client ready");
        Ok(Self { client, url, config })
    }

    /// The wire protocol in use.
    pub fn protocol(&self) -> WireProtocol {
        self.config.protocol
    }

    /// The full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> RequestBody<'a> {
        match self.config.protocol {
            WireProtocol::Chat => RequestBody::Chat(ChatRequest {
                model: &self.config.model,
                messages: [ChatMessageOut { role: "user", content: prompt }],
                temperature: self.config.temperature,
                stream: false,
            }),
            WireProtocol::Completion => RequestBody::Completion(CompletionRequest {
                model: &self.config.model,
                prompt,
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
                stream: false,
            }),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> RagError {
        if e.is_timeout() {
            error!(url = %self.url, "generation request timed out");
            RagError::UpstreamTimeout { seconds: self.config.timeout.as_secs() }
        } else {
            error!(url = %self.url, error = %e, "failed to reach generation service");
            RagError::UpstreamUnavailable(e.to_string())
        }
    }
}

#[async_trait]
impl Generator for GenerationClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(url = %self.url, prompt_len = prompt.len(), "sending completion request");

        let response = self
            .client
            .post(&self.url)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(%status, %detail, "generation service returned an error");
            return Err(RagError::UpstreamHttp { status: status.as_u16(), detail });
        }

        parse_answer(self.config.protocol, &body).inspect_err(|e| {
            error!(error = %e, body = %body, "unexpected generation response shape");
        })
    }
}

/// Extract the answer from a 2xx response body under `protocol`.
pub fn parse_answer(protocol: WireProtocol, body: &str) -> Result<String> {
    let bad = |e: serde_json::Error| RagError::UpstreamBadResponse(e.to_string());
    let answer = match protocol {
        WireProtocol::Chat => serde_json::from_str::<ChatResponse>(body)
            .map_err(bad)?
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content),
        WireProtocol::Completion => serde_json::from_str::<CompletionResponse>(body)
            .map_err(bad)?
            .choices
            .into_iter()
            .next()
            .map(|c| c.text),
    };
    answer
        .map(|a| a.trim().to_string())
        .ok_or_else(|| RagError::UpstreamBadResponse("response has no choices".to_string()))
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(untagged)]
enum RequestBody<'a> {
    Chat(ChatRequest<'a>),
    Completion(CompletionRequest<'a>),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessageOut<'a>; 1],
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessageOut<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageIn,
}

#[derive(Deserialize)]
struct ChatMessageIn {
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}
