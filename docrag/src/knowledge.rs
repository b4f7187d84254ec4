//! The index/corpus pair produced by ingestion and loaded for serving.

use tracing::info;

use crate::config::ArtifactPaths;
use crate::corpus::CorpusStore;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;

/// A vector index and its corpus store, guaranteed to be the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    index: FlatIndex,
    corpus: CorpusStore,
}

impl KnowledgeBase {
    /// Pair an index with its corpus.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptArtifact`] if the two disagree on the number
    /// of chunks.
    pub fn new(index: FlatIndex, corpus: CorpusStore) -> Result<Self> {
        if index.len() != corpus.len() {
            return Err(RagError::CorruptArtifact(format!(
                "index holds {} vectors but corpus holds {} chunks",
                index.len(),
                corpus.len()
            )));
        }
        Ok(Self { index, corpus })
    }

    /// An empty knowledge base for vectors of length `dimension`.
    pub fn empty(dimension: usize) -> Self {
        Self { index: FlatIndex::new(dimension), corpus: CorpusStore::new() }
    }

    /// Load both artifacts and check they line up.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let index = FlatIndex::load(&paths.index_path)?;
        let corpus = CorpusStore::load(&paths.corpus_path)?;
        let kb = Self::new(index, corpus)?;
        info!(
            chunk_count = kb.len(),
            dimension = kb.dimension(),
            index = %paths.index_path.display(),
            "loaded knowledge base"
        );
        Ok(kb)
    }

    /// Write both artifacts. The index is written first so that a crash
    /// between the two renames leaves a detectable length mismatch.
    pub fn save(&self, paths: &ArtifactPaths) -> Result<()> {
        self.index.save(&paths.index_path)?;
        self.corpus.save(&paths.corpus_path)
    }

    /// The vector index.
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// The corpus store.
    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    /// Whether there are no chunks.
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Vector dimension of the index.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }
}
