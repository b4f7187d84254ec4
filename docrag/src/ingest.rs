//! Offline ingestion: discover → extract → chunk → embed → index → persist.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::{ArtifactPaths, RagConfig};
use crate::corpus::CorpusStore;
use crate::document::Document;
use crate::embedding::{EmbeddingProvider, ensure_dimensions};
use crate::error::{RagError, Result};
use crate::extract::{PdfTextExtractor, TextExtractor, discover_pdfs};
use crate::index::FlatIndex;
use crate::knowledge::KnowledgeBase;

/// Summary of an ingestion run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct IngestReport {
    /// PDF files discovered.
    pub documents_found: usize,
    /// Files whose text could not be extracted.
    pub documents_skipped: usize,
    /// Chunks written to the index.
    pub chunk_count: usize,
    /// Vector dimension of the index.
    pub dimension: usize,
}

/// Builds the knowledge base from a directory of documents.
///
/// Extraction failures are logged and the file is skipped; every other
/// failure aborts the run before anything is written.
pub struct Ingestor {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Ingestor {
    /// Create an ingestor using fixed-size chunking and PDF extraction.
    pub fn new(config: RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let chunker = FixedSizeChunker::from_config(&config)?;
        Ok(Self {
            config,
            chunker: Arc::new(chunker),
            extractor: Arc::new(PdfTextExtractor),
            embedder,
        })
    }

    /// Replace the text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the chunker.
    pub fn with_chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest `documents_dir` and persist the artifacts to `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocuments`] when no PDF yields any text; nothing
    /// is written in that case.
    pub async fn run(&self, documents_dir: &Path, paths: &ArtifactPaths) -> Result<IngestReport> {
        let (knowledge, report) = self.build_from_dir(documents_dir).await?;
        knowledge.save(paths)?;
        info!(
            documents = report.documents_found,
            skipped = report.documents_skipped,
            chunk_count = report.chunk_count,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Ingest `documents_dir` into an in-memory knowledge base.
    pub async fn build_from_dir(&self, documents_dir: &Path) -> Result<(KnowledgeBase, IngestReport)> {
        let files = discover_pdfs(documents_dir)?;
        if files.is_empty() {
            return Err(RagError::NoDocuments(format!(
                "no PDF files found in {}",
                documents_dir.display()
            )));
        }
        info!(count = files.len(), dir = %documents_dir.display(), "found PDF files; extracting text");

        let mut documents = Vec::with_capacity(files.len());
        let mut skipped = 0;
        for path in &files {
            match self.extractor.extract(path) {
                Ok(pages) => documents.push(Document::from_pages(path, pages)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping document");
                    skipped += 1;
                }
            }
        }

        let knowledge = self.ingest_documents(&documents).await?;
        let report = IngestReport {
            documents_found: files.len(),
            documents_skipped: skipped,
            chunk_count: knowledge.len(),
            dimension: knowledge.dimension(),
        };
        Ok((knowledge, report))
    }

    /// Chunk and embed already-extracted documents.
    ///
    /// Ordinals follow document order, then chunk order within a document.
    pub async fn ingest_documents(&self, documents: &[Document]) -> Result<KnowledgeBase> {
        let mut corpus = CorpusStore::new();
        for document in documents {
            let chunks = self.chunker.split(&document.text);
            info!(path = %document.path.display(), chunk_count = chunks.len(), "chunked document");
            let source = document.path.to_string_lossy().into_owned();
            for text in chunks {
                corpus.push(text, Some(source.clone()));
            }
        }

        if corpus.is_empty() {
            return Err(RagError::NoDocuments(
                "no text could be extracted or chunked".to_string(),
            ));
        }

        let dimension = self.embedder.dimensions();
        let mut index = FlatIndex::new(dimension);
        let texts: Vec<String> = corpus.iter().map(|c| c.text).collect();

        info!(chunk_count = texts.len(), dimension, "embedding chunks");
        for batch in texts.chunks(self.config.embed_batch_size) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let vectors = self.embedder.embed_batch(&refs).await.map_err(|e| {
                error!(error = %e, "embedding failed during ingestion");
                e
            })?;
            if vectors.len() != refs.len() {
                return Err(RagError::Embedding {
                    provider: "ingestion".to_string(),
                    message: format!("asked for {} embeddings, got {}", refs.len(), vectors.len()),
                });
            }
            ensure_dimensions(&vectors, dimension)?;
            for vector in &vectors {
                index.add(vector)?;
            }
        }

        KnowledgeBase::new(index, corpus)
    }
}
