//! The ordered chunk texts that sit beside the vector index.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Chunk;
use crate::error::Result;
use crate::persist::write_atomic;

/// A persisted chunk: its text and the document it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredChunk {
    /// The chunk text.
    pub text: String,
    /// Path of the source document, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Chunk texts in ordinal order. Entry `i` describes vector `i` of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusStore {
    chunks: Vec<StoredChunk>,
}

impl CorpusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return its ordinal.
    pub fn push(&mut self, text: impl Into<String>, document: Option<String>) -> usize {
        self.chunks.push(StoredChunk { text: text.into(), document });
        self.chunks.len() - 1
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The chunk at `ordinal`.
    pub fn get(&self, ordinal: usize) -> Option<Chunk> {
        self.chunks.get(ordinal).map(|c| Chunk { ordinal, text: c.text.clone() })
    }

    /// The persisted record at `ordinal`, including its source document.
    pub fn record(&self, ordinal: usize) -> Option<&StoredChunk> {
        self.chunks.get(ordinal)
    }

    /// Iterate over all chunks in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = Chunk> + '_ {
        self.chunks
            .iter()
            .enumerate()
            .map(|(ordinal, c)| Chunk { ordinal, text: c.text.clone() })
    }

    /// Persist as a JSON array, atomically replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(self)?;
        write_atomic(path, &bytes)?;
        info!(path = %path.display(), count = self.len(), "saved corpus store");
        Ok(())
    }

    /// Load a store written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl<S: Into<String>> FromIterator<S> for CorpusStore {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            chunks: iter
                .into_iter()
                .map(|text| StoredChunk { text: text.into(), document: None })
                .collect(),
        }
    }
}
