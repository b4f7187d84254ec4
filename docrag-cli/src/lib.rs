//! Command-line launcher for docrag.
//!
//! Every flag has an environment fallback, so a `.env` file next to the
//! binary is enough to configure ingestion and serving.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use docrag::{
    ArtifactPaths, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K, EmbeddingConfig,
    GenerationClient, GenerationConfig, HttpEmbeddingProvider, Ingestor, RagConfig,
    ServiceContext, WireProtocol,
};
use docrag_server::{ServerConfig, run_server};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "docrag", version, about = "Answer questions over a folder of PDFs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract, chunk and embed every PDF, then write the index artifacts
    Ingest(IngestArgs),
    /// Serve the question-answering HTTP API
    Serve(ServeArgs),
    /// Answer a single question and print the cited chunks
    Ask(AskArgs),
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory searched recursively for PDF files
    #[arg(long, env = "DOCRAG_DOCUMENTS_DIR", default_value = "documents")]
    pub documents: PathBuf,

    /// Chunk length in characters
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Texts sent per embeddings request
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "DOCRAG_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "DOCRAG_PORT", default_value_t = 8000)]
    pub port: u16,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    #[command(flatten)]
    pub query: QueryArgs,
}

/// Everything needed to load the artifacts and answer questions.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Chunks retrieved per question
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    #[command(flatten)]
    pub generation: GenerationArgs,
}

#[derive(Args, Debug)]
pub struct ArtifactArgs {
    /// Binary vector index
    #[arg(long, env = "DOCRAG_INDEX_PATH", default_value = "vector_index.bin")]
    pub index_path: PathBuf,

    /// JSON chunk list aligned with the index
    #[arg(long, env = "DOCRAG_CORPUS_PATH", default_value = "chunks.json")]
    pub corpus_path: PathBuf,
}

impl ArtifactArgs {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths { index_path: self.index_path.clone(), corpus_path: self.corpus_path.clone() }
    }
}

#[derive(Args, Debug)]
pub struct EmbeddingArgs {
    /// Base URL of the OpenAI-compatible embeddings server
    #[arg(long, env = "EMBEDDING_URL", default_value = "http://localhost:1234")]
    pub embedding_url: String,

    /// Embedding model identifier
    #[arg(long, env = "EMBEDDING_MODEL", default_value = "all-MiniLM-L6-v2")]
    pub embedding_model: String,

    /// Vector length produced by the embedding model
    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = 384)]
    pub embedding_dimensions: usize,

    /// Bearer token for the embeddings server
    #[arg(long, env = "EMBEDDING_API_KEY", hide_env_values = true)]
    pub embedding_api_key: Option<String>,

    /// Seconds to wait for an embeddings response before giving up
    #[arg(long, env = "EMBEDDING_TIMEOUT_SECS", default_value_t = 30)]
    pub embedding_timeout_secs: u64,
}

impl EmbeddingArgs {
    pub fn config(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url: self.embedding_url.clone(),
            model: self.embedding_model.clone(),
            dimensions: self.embedding_dimensions,
            api_key: self.embedding_api_key.clone(),
            timeout: Duration::from_secs(self.embedding_timeout_secs),
            ..EmbeddingConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerationArgs {
    /// Base URL of the completion server
    #[arg(long = "llm-url", env = "LM_STUDIO_URL", default_value = "http://localhost:1234")]
    pub url: String,

    /// Model identifier sent with each completion request
    #[arg(long = "llm-model", env = "LM_STUDIO_MODEL", default_value = "local-model")]
    pub model: String,

    /// Request shape: chat or completion
    #[arg(long = "llm-protocol", env = "LM_STUDIO_PROTOCOL", default_value = "chat")]
    pub protocol: WireProtocol,

    /// Endpoint path, overriding the protocol's default
    #[arg(long = "llm-endpoint", env = "LM_STUDIO_API_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Sampling temperature
    #[arg(long = "llm-temperature", env = "LM_STUDIO_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,

    /// Token budget for completion requests
    #[arg(long = "llm-max-tokens", env = "LM_STUDIO_MAX_TOKENS", default_value_t = 4096)]
    pub max_tokens: u32,

    /// Seconds to wait for a completion before giving up
    #[arg(long = "llm-timeout-secs", env = "LM_STUDIO_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,
}

impl GenerationArgs {
    pub fn config(&self) -> GenerationConfig {
        GenerationConfig {
            base_url: self.url.clone(),
            protocol: self.protocol,
            endpoint_path: self.endpoint.clone().filter(|path| !path.trim().is_empty()),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl QueryArgs {
    /// Load the artifacts and wire the HTTP collaborators into a service context.
    pub fn load_context(&self) -> Result<ServiceContext> {
        let embedder = HttpEmbeddingProvider::new(self.embedding.config())
            .context("failed to build embeddings client")?;
        let generator = GenerationClient::new(self.generation.config())
            .context("failed to build generation client")?;
        info!(url = generator.url(), protocol = %generator.protocol(), "generation endpoint");

        Ok(ServiceContext::load(
            &self.artifacts.paths(),
            Arc::new(embedder),
            Arc::new(generator),
            self.top_k,
        ))
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest(args) => ingest(args).await,
        Command::Serve(args) => serve(args).await,
        Command::Ask(args) => ask(args).await,
    }
}

async fn ingest(args: IngestArgs) -> Result<()> {
    let config = RagConfig::builder()
        .chunk_size(args.chunk_size)
        .chunk_overlap(args.chunk_overlap)
        .embed_batch_size(args.batch_size)
        .build()?;
    let embedder = HttpEmbeddingProvider::new(args.embedding.config())
        .context("failed to build embeddings client")?;

    let report = Ingestor::new(config, Arc::new(embedder))?
        .run(&args.documents, &args.artifacts.paths())
        .await
        .with_context(|| format!("ingestion of {} failed", args.documents.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<()> {
    let context = args.query.load_context()?;
    run_server(ServerConfig { host: args.host, port: args.port }, context).await
}

async fn ask(args: AskArgs) -> Result<()> {
    let context = args.query.load_context()?;
    if let ServiceContext::Unready { reason } = &context {
        bail!("cannot answer: {reason}");
    }

    let exchange = context.ask(&args.question, None).await?;
    println!("{}", exchange.answer);
    if !exchange.retrieved_chunks.is_empty() {
        println!("\n--- Sources ---");
        for (rank, chunk) in exchange.retrieved_chunks.iter().enumerate() {
            println!("[{}] {}", rank + 1, chunk.trim());
        }
    }
    Ok(())
}
