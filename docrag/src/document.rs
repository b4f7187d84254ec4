//! Data types for documents, chunks, and retrieval results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A source document after text extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Where the document was read from.
    pub path: PathBuf,
    /// Extracted text, pages concatenated in order.
    pub text: String,
}

impl Document {
    /// Build a document from per-page texts.
    pub fn from_pages(path: impl Into<PathBuf>, pages: Vec<String>) -> Self {
        Self { path: path.into(), text: pages.concat() }
    }
}

/// A bounded substring of a source document, the unit of retrieval.
///
/// `ordinal` is the chunk's position in the corpus store and the only join key
/// between the corpus store and the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the corpus store (and in the vector index).
    pub ordinal: usize,
    /// The chunk text.
    pub text: String,
}

/// A retrieved [`Chunk`] paired with its distance to the query vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query (lower is more relevant).
    pub distance: f32,
}

/// Up to `k` chunks ranked by ascending distance to the query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// Results in rank order.
    pub results: Vec<SearchResult>,
}

impl RetrievalResult {
    /// Number of retrieved chunks.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing was retrieved.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Chunk texts in rank order.
    pub fn texts(&self) -> Vec<String> {
        self.results.iter().map(|r| r.chunk.text.clone()).collect()
    }
}

/// One answered question. Transient, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatExchange {
    /// The question as asked.
    pub question: String,
    /// Texts of the chunks that grounded the answer, in rank order.
    pub retrieved_chunks: Vec<String>,
    /// The model's answer.
    pub answer: String,
}
