//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use docchat::embedding::Embedder;
use docchat::generation::{AnswerGenerator, GenerationOutcome, GenerationRequest, GenerationResult};
use docchat::RetrievalError;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Four-chunk corpus over two documents, 3-dimensional embeddings
pub const CORPUS_JSON: &str = r#"[
  {"source_document": "telnet.pdf", "text": "Telnet is a telecom partner based in Tunis.", "embedding": [1.0, 0.0, 0.0]},
  {"source_document": "telnet.pdf", "text": "Telnet builds embedded software for operators.", "embedding": [0.9, 0.1, 0.0]},
  {"pdf": "weather.pdf", "text": "The weather in Tunis is sunny most of the year.", "embedding": [0.0, 1.0, 0.0]},
  {"source_document": "weather.pdf", "text": "Rain is rare in summer.", "embedding": [0.0, 0.8, 0.6]}
]"#;

pub fn chunk_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write chunk file");
    file
}

/// Maps queries to fixed vectors by keyword and records every query
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(text.to_string());

        let lower = text.to_lowercase();
        if lower.contains("offline") {
            return Err(RetrievalError::Embedding("embedding backend offline".to_string()));
        }
        Ok(if lower.contains("telnet") {
            vec![1.0, 0.0, 0.0]
        } else if lower.contains("weather") || lower.contains("météo") {
            vec![0.0, 1.0, 0.0]
        } else {
            vec![0.0, 0.0, -1.0]
        })
    }

    fn dimension(&self) -> Option<usize> {
        Some(3)
    }

    fn name(&self) -> String {
        "keyword".to_string()
    }
}

/// Records requests; answers or fails on demand
pub struct RecordingGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub fail_with: Option<String>,
}

impl RecordingGenerator {
    pub fn answering() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        self.requests.lock().unwrap().push(request.clone());
        match &self.fail_with {
            Some(reason) => GenerationOutcome::failed(reason.clone()),
            None => GenerationOutcome::Answered(GenerationResult {
                text: format!("Answer from {} passages", request.passages.len()),
            }),
        }
    }
}
