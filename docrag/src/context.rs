//! Process-wide, read-only serving state.

use std::io::ErrorKind;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ArtifactPaths;
use crate::document::ChatExchange;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::Generator;
use crate::knowledge::KnowledgeBase;
use crate::pipeline::RagPipeline;
use crate::retriever::Retriever;

/// Everything a request handler needs, constructed once at startup.
///
/// Loading never fails outright: missing or broken artifacts produce the
/// [`Unready`](ServiceContext::Unready) variant, which answers every question
/// with [`RagError::NotReady`] and reports its reason through
/// [`status`](ServiceContext::status).
#[derive(Clone)]
pub enum ServiceContext {
    /// Artifacts and collaborators are loaded.
    Ready(Arc<RagPipeline>),
    /// Something required is missing.
    Unready {
        /// Human-readable cause, shown by the readiness check.
        reason: String,
    },
}

/// Readiness report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceStatus {
    /// Whether questions can be answered.
    pub ready: bool,
    /// Chunks in the loaded knowledge base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    /// Vector dimension of the loaded index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    /// Why the service is not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ServiceContext {
    /// Wrap a built pipeline.
    pub fn ready(pipeline: RagPipeline) -> Self {
        Self::Ready(Arc::new(pipeline))
    }

    /// A context that refuses every question with `reason`.
    pub fn unready(reason: impl Into<String>) -> Self {
        Self::Unready { reason: reason.into() }
    }

    /// Load the persisted artifacts and assemble the pipeline.
    pub fn load(
        paths: &ArtifactPaths,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn Generator>,
        top_k: usize,
    ) -> Self {
        let knowledge = match KnowledgeBase::load(paths) {
            Ok(kb) => kb,
            Err(RagError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                let reason = format!(
                    "index artifacts not found ({}, {}); run ingestion first",
                    paths.index_path.display(),
                    paths.corpus_path.display()
                );
                warn!(%reason, "starting unready");
                return Self::unready(reason);
            }
            Err(e) => {
                warn!(error = %e, "failed to load knowledge base; starting unready");
                return Self::unready(e.to_string());
            }
        };

        if !knowledge.is_empty() && knowledge.dimension() != embedder.dimensions() {
            warn!(
                index_dimension = knowledge.dimension(),
                embedder_dimension = embedder.dimensions(),
                "embedder and index disagree on dimension; questions will fail until re-ingestion"
            );
        }

        let retriever = Retriever::new(embedder, Arc::new(knowledge));
        match RagPipeline::builder().retriever(retriever).generator(generator).top_k(top_k).build()
        {
            Ok(pipeline) => {
                info!("RAG components loaded");
                Self::ready(pipeline)
            }
            Err(e) => Self::unready(e.to_string()),
        }
    }

    /// Whether questions can be answered.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The pipeline, or [`RagError::NotReady`].
    pub fn pipeline(&self) -> Result<&RagPipeline> {
        match self {
            Self::Ready(pipeline) => Ok(pipeline),
            Self::Unready { reason } => Err(RagError::NotReady { reason: reason.clone() }),
        }
    }

    /// Answer a question, or fail with [`RagError::NotReady`].
    pub async fn ask(&self, question: &str, session_id: Option<&str>) -> Result<ChatExchange> {
        self.pipeline()?.ask(question, session_id).await
    }

    /// Readiness report for health checks.
    pub fn status(&self) -> ServiceStatus {
        match self {
            Self::Ready(pipeline) => {
                let knowledge = pipeline.retriever().knowledge();
                ServiceStatus {
                    ready: true,
                    chunk_count: Some(knowledge.len()),
                    dimension: Some(knowledge.dimension()),
                    reason: None,
                }
            }
            Self::Unready { reason } => ServiceStatus {
                ready: false,
                chunk_count: None,
                dimension: None,
                reason: Some(reason.clone()),
            },
        }
    }
}
