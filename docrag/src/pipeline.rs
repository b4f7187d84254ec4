//! Question-answering pipeline: retrieve → build prompt → generate.
//!
//! # Example
//!
//! ```rust,ignore
//! use docrag::{GenerationClient, RagPipeline, Retriever};
//!
//! let pipeline = RagPipeline::builder()
//!     .retriever(Retriever::new(embedder, knowledge))
//!     .generator(Arc::new(GenerationClient::new(generation_config)?))
//!     .top_k(5)
//!     .build()?;
//!
//! let exchange = pipeline.ask("What is the refund policy?", None).await?;
//! ```

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use crate::config::DEFAULT_TOP_K;
use crate::document::ChatExchange;
use crate::error::{RagError, Result};
use crate::generation::Generator;
use crate::prompt::build_prompt;
use crate::retriever::Retriever;

/// Answers questions grounded on retrieved chunks.
///
/// Immutable once built; share it behind an `Arc`.
pub struct RagPipeline {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// The retriever in use.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Number of chunks retrieved per question.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `question`, returning the answer with the chunks that grounded it.
    ///
    /// `session_id` is only recorded in logs; each question is independent.
    /// The question reaches the prompt verbatim, surrounding whitespace included.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidQuestion`] for a blank question, and
    /// propagates retrieval and generation failures unchanged so callers can
    /// tell them apart.
    pub async fn ask(&self, question: &str, session_id: Option<&str>) -> Result<ChatExchange> {
        let span = info_span!("ask", session_id = session_id.unwrap_or("-"));
        self.answer(question).instrument(span).await
    }

    async fn answer(&self, question: &str) -> Result<ChatExchange> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidQuestion("question must not be empty".to_string()));
        }
        info!(question_len = question.len(), "received question");

        let retrieved = self.retriever.retrieve(question, self.top_k).await?;
        let chunks = retrieved.texts();
        let prompt = build_prompt(question, &chunks);

        let answer = self.generator.complete(&prompt).await.map_err(|e| {
            error!(error = %e, "generation failed");
            e
        })?;

        info!(chunk_count = chunks.len(), answer_len = answer.len(), "answered question");
        Ok(ChatExchange { question: question.to_string(), retrieved_chunks: chunks, answer })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `retriever` and `generator` are required; `top_k` defaults to 5.
#[derive(Default)]
pub struct RagPipelineBuilder {
    retriever: Option<Retriever>,
    generator: Option<Arc<dyn Generator>>,
    top_k: Option<usize>,
}

impl RagPipelineBuilder {
    /// Set the retriever.
    pub fn retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the answer generator.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing or
    /// `top_k` is zero.
    pub fn build(self) -> Result<RagPipeline> {
        let retriever =
            self.retriever.ok_or_else(|| RagError::Config("retriever is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::Config("generator is required".to_string()))?;
        let top_k = self.top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }

        Ok(RagPipeline { retriever, generator, top_k })
    }
}
