//! Text embedding backends
//!
//! The retrieval engine only sees the [`Embedder`] trait: text in, fixed-length
//! vector out. Two backends are provided:
//! - `CandleEmbedder`: local BERT sentence model (all-MiniLM-L6-v2 by default)
//! - `OllamaEmbedder`: the `/api/embeddings` endpoint of a running Ollama

pub mod engine;
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RetrievalError;

pub use engine::CandleEmbedder;
pub use ollama::OllamaEmbedder;

/// Converts text into an embedding vector.
///
/// Implementations must be deterministic for identical input within a process
/// and must report failure instead of returning a placeholder vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;

    /// Embed several texts, in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Output dimensionality, when known ahead of the first call
    fn dimension(&self) -> Option<usize>;

    /// Human-readable backend/model label
    fn name(&self) -> String;
}

/// Which embedding backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Candle,
    Ollama,
}

impl EmbeddingBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingBackend::Candle => "candle",
            EmbeddingBackend::Ollama => "ollama",
        }
    }
}
