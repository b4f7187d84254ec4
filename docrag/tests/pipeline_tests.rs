//! End-to-end ingestion and question answering with in-process collaborators.

mod common;

use std::fs;
use std::sync::Arc;

use axum::{Json, Router, routing::post};
use docrag::{
    ArtifactPaths, FALLBACK_ANSWER, GenerationClient, GenerationConfig, Generator, Ingestor,
    KnowledgeBase, RagConfig, RagError, RagPipeline, Retriever, ServiceContext,
};
use serde_json::{Value, json};

use common::{BagOfWordsEmbedder, RecordingGenerator, StaticExtractor, spawn_upstream};

const DIM: usize = 64;

const ZEBRA_DOC: &str = "Field notes. The zebra population at the northern reserve \
    was counted in March and totalled 412 animals. Rainfall was unusually low.";
const HARBOUR_DOC: &str = "Harbour authority bulletin. Ferry departures resume on \
    Monday at 06:30 from pier four after the maintenance window.";

fn small_chunks() -> RagConfig {
    RagConfig::builder().chunk_size(80).chunk_overlap(20).top_k(2).build().unwrap()
}

fn ingestor(config: RagConfig) -> Ingestor {
    let extractor = StaticExtractor::default()
        .with("zebras.pdf", ZEBRA_DOC)
        .with("harbour.pdf", HARBOUR_DOC);
    Ingestor::new(config, Arc::new(BagOfWordsEmbedder::new(DIM)))
        .unwrap()
        .with_extractor(Arc::new(extractor))
}

fn write_documents(dir: &std::path::Path) {
    fs::write(dir.join("zebras.pdf"), b"%PDF").unwrap();
    fs::write(dir.join("harbour.pdf"), b"%PDF").unwrap();
    fs::write(dir.join("corrupt.pdf"), b"%PDF").unwrap();
}

fn paths(dir: &std::path::Path) -> ArtifactPaths {
    ArtifactPaths {
        index_path: dir.join("out").join("vector_index.bin"),
        corpus_path: dir.join("out").join("chunks.json"),
    }
}

#[tokio::test]
async fn ingest_then_ask_cites_the_chunk_holding_the_answer() {
    let docs = tempfile::tempdir().unwrap();
    write_documents(docs.path());
    let paths = paths(docs.path());

    let report = ingestor(small_chunks()).run(docs.path(), &paths).await.unwrap();
    assert_eq!(report.documents_found, 3);
    assert_eq!(report.documents_skipped, 1);
    assert_eq!(report.dimension, DIM);
    assert!(report.chunk_count >= 4);

    let generator = Arc::new(RecordingGenerator::new("412 zebras."));
    let context = ServiceContext::load(
        &paths,
        Arc::new(BagOfWordsEmbedder::new(DIM)),
        generator.clone(),
        2,
    );
    assert!(context.is_ready());
    assert_eq!(context.status().chunk_count, Some(report.chunk_count));

    let exchange = context
        .ask("How many zebra animals were counted at the reserve?", Some("s-1"))
        .await
        .unwrap();

    assert_eq!(exchange.answer, "412 zebras.");
    assert!(exchange.retrieved_chunks.len() <= 2);
    assert!(
        exchange.retrieved_chunks.iter().any(|c| c.contains("totalled 412")),
        "cited: {:?}",
        exchange.retrieved_chunks
    );

    let prompt = generator.last_prompt().unwrap();
    let cited = prompt.find("totalled 412").unwrap();
    let asked = prompt.find("How many zebra animals").unwrap();
    assert!(cited < asked);
}

#[tokio::test]
async fn ordinals_follow_document_then_chunk_order() {
    let docs = tempfile::tempdir().unwrap();
    write_documents(docs.path());

    let (knowledge, _) = ingestor(small_chunks()).build_from_dir(docs.path()).await.unwrap();

    // Files are visited in path order: corrupt.pdf (skipped), harbour.pdf, zebras.pdf.
    let first = knowledge.corpus().record(0).unwrap();
    assert!(first.text.starts_with("Harbour authority"));
    assert!(first.document.as_deref().unwrap().ends_with("harbour.pdf"));
    let last = knowledge.corpus().record(knowledge.len() - 1).unwrap();
    assert!(last.document.as_deref().unwrap().ends_with("zebras.pdf"));
    assert_eq!(knowledge.index().len(), knowledge.corpus().len());
}

#[tokio::test]
async fn ingest_with_nothing_extractable_writes_nothing() {
    let docs = tempfile::tempdir().unwrap();
    fs::write(docs.path().join("corrupt.pdf"), b"%PDF").unwrap();
    let paths = paths(docs.path());

    let err = ingestor(RagConfig::default()).run(docs.path(), &paths).await.unwrap_err();
    assert!(matches!(err, RagError::NoDocuments(_)));
    assert!(!paths.index_path.exists());
    assert!(!paths.corpus_path.exists());
}

#[tokio::test]
async fn retriever_on_empty_corpus_returns_nothing() {
    let retriever = Retriever::new(
        Arc::new(BagOfWordsEmbedder::new(DIM)),
        Arc::new(KnowledgeBase::empty(DIM)),
    );
    let result = retriever.retrieve("anything at all?", 5).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn empty_corpus_still_reaches_the_model_with_fallback_instruction() {
    let generator = Arc::new(RecordingGenerator::new(FALLBACK_ANSWER));
    let pipeline = RagPipeline::builder()
        .retriever(Retriever::new(
            Arc::new(BagOfWordsEmbedder::new(DIM)),
            Arc::new(KnowledgeBase::empty(DIM)),
        ))
        .generator(generator.clone())
        .build()
        .unwrap();

    let exchange = pipeline.ask("Where is the lighthouse?", None).await.unwrap();
    assert!(exchange.retrieved_chunks.is_empty());
    assert_eq!(exchange.answer, FALLBACK_ANSWER);
    assert!(generator.last_prompt().unwrap().contains(FALLBACK_ANSWER));
}

#[tokio::test]
async fn embedder_drift_surfaces_as_dimension_mismatch() {
    let docs = tempfile::tempdir().unwrap();
    write_documents(docs.path());
    let (knowledge, _) = ingestor(small_chunks()).build_from_dir(docs.path()).await.unwrap();

    let retriever = Retriever::new(Arc::new(BagOfWordsEmbedder::new(DIM / 2)), Arc::new(knowledge));
    let err = retriever.retrieve("zebra", 3).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: DIM, actual: 32 }));
}

#[tokio::test]
async fn missing_artifacts_yield_unready_context() {
    let dir = tempfile::tempdir().unwrap();
    let context = ServiceContext::load(
        &paths(dir.path()),
        Arc::new(BagOfWordsEmbedder::new(DIM)),
        Arc::new(RecordingGenerator::new("unused")),
        5,
    );

    assert!(!context.is_ready());
    let status = context.status();
    assert!(!status.ready);
    assert!(status.reason.unwrap().contains("run ingestion first"));

    let err = context.ask("hello?", None).await.unwrap_err();
    assert!(matches!(err, RagError::NotReady { .. }));
}

#[tokio::test]
async fn blank_question_is_rejected_before_retrieval() {
    let generator = Arc::new(RecordingGenerator::new("unused"));
    let context = ServiceContext::ready(
        RagPipeline::builder()
            .retriever(Retriever::new(
                Arc::new(BagOfWordsEmbedder::new(DIM)),
                Arc::new(KnowledgeBase::empty(DIM)),
            ))
            .generator(generator.clone())
            .build()
            .unwrap(),
    );

    let err = context.ask("   ", None).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidQuestion(_)));
    assert!(generator.last_prompt().is_none());
}

#[tokio::test]
async fn question_reaches_the_prompt_verbatim() {
    let generator = Arc::new(RecordingGenerator::new("unused"));
    let pipeline = RagPipeline::builder()
        .retriever(Retriever::new(
            Arc::new(BagOfWordsEmbedder::new(DIM)),
            Arc::new(KnowledgeBase::empty(DIM)),
        ))
        .generator(generator.clone())
        .build()
        .unwrap();

    let exchange = pipeline.ask("  Where is\tthe lighthouse?\n", None).await.unwrap();
    assert_eq!(exchange.question, "  Where is\tthe lighthouse?\n");
    assert!(
        generator
            .last_prompt()
            .unwrap()
            .contains("User question:   Where is\tthe lighthouse?\n\n")
    );
}

#[tokio::test]
async fn full_stack_over_http_generation() {
    let docs = tempfile::tempdir().unwrap();
    write_documents(docs.path());
    let paths = paths(docs.path());
    ingestor(small_chunks()).run(docs.path(), &paths).await.unwrap();

    // Upstream answers with the first context line that mentions ferries.
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
            let answer = if prompt.contains("Ferry departures") { "Monday 06:30" } else { FALLBACK_ANSWER };
            Json(json!({"choices": [{"message": {"content": answer}}]}))
        }),
    );
    let (base, handle) = spawn_upstream(app).await;

    let generator: Arc<dyn Generator> = Arc::new(
        GenerationClient::new(GenerationConfig { base_url: base, ..GenerationConfig::default() })
            .unwrap(),
    );
    let context =
        ServiceContext::load(&paths, Arc::new(BagOfWordsEmbedder::new(DIM)), generator, 2);

    let exchange = context.ask("When do ferry departures resume?", None).await.unwrap();
    assert_eq!(exchange.answer, "Monday 06:30");
    assert!(exchange.retrieved_chunks.iter().any(|c| c.contains("Ferry departures")));

    handle.abort();
}
