//! Embeddings served by a local Ollama instance
//!
//! Endpoint: POST /api/embeddings `{model, prompt}` → `{embedding}`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::embedding::Embedder;
use crate::errors::{DocChatError, RetrievalError};

/// Request timeout for a single embedding call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedding client for Ollama
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: Option<usize>,
}

impl OllamaEmbedder {
    /// `dimension` is the expected vector size, if known from configuration
    pub fn new(base_url: &str, model: &str, dimension: Option<usize>) -> Result<Self, DocChatError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DocChatError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("Failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RetrievalError::Embedding(format!("HTTP {}: {}", status, error_text)));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("Failed to parse embedding: {}", e)))?;

        if body.embedding.is_empty() {
            return Err(RetrievalError::Embedding(format!(
                "Model '{}' returned an empty embedding",
                self.model
            )));
        }

        Ok(body.embedding)
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}
