//! Retrieval-augmented question answering over a private PDF corpus.
//!
//! Ingestion chunks extracted document text, embeds every chunk and stores the
//! vectors in a [`FlatIndex`] next to an index-aligned [`CorpusStore`]. At
//! query time a [`RagPipeline`] embeds the question, pulls the nearest chunks,
//! wraps them in a grounding prompt and asks an external completion service
//! through [`GenerationClient`].
//!
//! Serving code holds a [`ServiceContext`], which is either ready or carries
//! the reason it is not.

#![warn(missing_docs)]

pub mod chunking;
pub mod config;
pub mod context;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod knowledge;
pub mod openai;
mod persist;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use chunking::{Chunker, FixedSizeChunker, chunk_text};
pub use config::{
    ArtifactPaths, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K, EmbeddingConfig,
    GenerationConfig, RagConfig, RagConfigBuilder, WireProtocol,
};
pub use context::{ServiceContext, ServiceStatus};
pub use corpus::{CorpusStore, StoredChunk};
pub use document::{ChatExchange, Chunk, Document, RetrievalResult, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{PdfTextExtractor, TextExtractor, discover_pdfs};
pub use generation::{GenerationClient, Generator, parse_answer};
pub use index::{FlatIndex, Neighbor};
pub use ingest::{IngestReport, Ingestor};
pub use knowledge::KnowledgeBase;
pub use openai::HttpEmbeddingProvider;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use prompt::{CONTEXT_SEPARATOR, FALLBACK_ANSWER, PROMPT_VERSION, build_prompt};
pub use retriever::Retriever;
