//! Question → top-k chunks.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::{RetrievalResult, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::knowledge::KnowledgeBase;

/// Embeds questions and looks up their nearest chunks.
///
/// Holds only shared read-only state, so one retriever can serve any number
/// of concurrent questions.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    knowledge: Arc<KnowledgeBase>,
}

impl Retriever {
    /// Create a retriever over a loaded knowledge base.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, knowledge: Arc<KnowledgeBase>) -> Self {
        Self { embedder, knowledge }
    }

    /// The knowledge base being searched.
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Return up to `k` chunks ranked by ascending distance to `question`.
    ///
    /// An empty knowledge base yields an empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] when the embedder's vectors do not
    /// fit the index, and propagates embedding failures.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        if self.knowledge.is_empty() {
            debug!("knowledge base is empty; nothing to retrieve");
            return Ok(RetrievalResult::default());
        }

        let query = self.embedder.embed(question).await?;
        let neighbors = self.knowledge.index().search(&query, k).map_err(|e| {
            error!(error = %e, "vector search failed");
            e
        })?;

        let results = neighbors
            .into_iter()
            .map(|n| {
                let chunk = self.knowledge.corpus().get(n.ordinal).ok_or_else(|| {
                    RagError::CorruptArtifact(format!("no chunk for ordinal {}", n.ordinal))
                })?;
                Ok(SearchResult { chunk, distance: n.distance })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(k, returned = results.len(), "retrieved chunks");
        Ok(RetrievalResult { results })
    }
}
