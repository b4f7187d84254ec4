//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use docrag::{EmbeddingProvider, Generator, RagError, TextExtractor};

/// Deterministic bag-of-words embedder: each lowercase word is hashed into a
/// bucket, then the vector is L2-normalised. Texts that share words end up
/// close together, which is all retrieval tests need.
pub struct BagOfWordsEmbedder {
    pub dimensions: usize,
}

impl BagOfWordsEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> docrag::Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimensions];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| w.len() > 2) {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            v[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Extractor that serves canned text by file name and fails for anything else.
#[derive(Default)]
pub struct StaticExtractor {
    pub texts: HashMap<String, String>,
}

impl StaticExtractor {
    pub fn with(mut self, file_name: &str, text: &str) -> Self {
        self.texts.insert(file_name.to_string(), text.to_string());
        self
    }
}

impl TextExtractor for StaticExtractor {
    fn extract(&self, path: &Path) -> docrag::Result<Vec<String>> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.texts.get(name).map(|t| vec![t.clone()]).ok_or_else(|| RagError::Extraction {
            path: path.to_path_buf(),
            message: "unreadable".to_string(),
        })
    }
}

/// Generator that records every prompt and answers with a fixed string.
pub struct RecordingGenerator {
    pub answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new(answer: &str) -> Self {
        Self { answer: answer.to_string(), prompts: Mutex::new(Vec::new()) }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn complete(&self, prompt: &str) -> docrag::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answer.clone())
    }
}

/// Serve `app` on an ephemeral local port; returns the base URL.
pub async fn spawn_upstream(app: axum::Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    (format!("http://{}", addr), handle)
}
