//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that maps text to fixed-dimension `f32` vectors.
///
/// Implementations must be deterministic for a fixed model version: the
/// index built at ingestion time is only meaningful if questions are embedded
/// by the same model. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends with native
/// batching should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Check that every vector has the provider's advertised dimension.
pub(crate) fn ensure_dimensions(vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    match vectors.iter().find(|v| v.len() != expected) {
        Some(v) => Err(RagError::DimensionMismatch { expected, actual: v.len() }),
        None => Ok(()),
    }
}
