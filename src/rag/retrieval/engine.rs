// Retrieval engine: embed query, rank the chunk store, truncate to top-k
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::embedding::Embedder;
use crate::errors::{DocChatError, Result, RetrievalError};
use crate::rag::filter::RelevanceFilter;
use crate::rag::similarity::{rank, ScoredChunk};
use crate::store::ChunkStore;

/// Search parameters for retrieval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Maximum number of results to retrieve
    pub top_k: usize,
    /// Results must score strictly above this to be kept
    pub min_score: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: 0.15,
        }
    }
}

/// Semantic search over an immutable chunk store.
///
/// The store is shared read-only; every call allocates its own query vector
/// and ranking buffer, so one engine can serve concurrent requests.
pub struct RetrievalEngine {
    store: Arc<ChunkStore>,
    embedder: Arc<dyn Embedder>,
    default_params: SearchParams,
}

impl RetrievalEngine {
    /// Fails when the embedder's declared dimension differs from the store's
    pub fn new(store: Arc<ChunkStore>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::with_params(store, embedder, SearchParams::default())
    }

    pub fn with_params(
        store: Arc<ChunkStore>,
        embedder: Arc<dyn Embedder>,
        params: SearchParams,
    ) -> Result<Self> {
        if let (Some(expected), Some(found)) = (store.dimension(), embedder.dimension()) {
            if expected != found {
                return Err(DocChatError::ConfigError(format!(
                    "Embedder {} produces {}-dimensional vectors but the chunk store holds {}-dimensional embeddings",
                    embedder.name(),
                    found,
                    expected
                )));
            }
        }

        Ok(Self {
            store,
            embedder,
            default_params: params,
        })
    }

    /// Embed `query` and return the `top_k` most similar chunks with scores.
    ///
    /// No threshold is applied here. An empty store yields an empty result
    /// without touching the embedder.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<ScoredChunk<'_>>, RetrievalError> {
        if self.store.is_empty() {
            tracing::debug!("Chunk store is empty, nothing to retrieve");
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        self.check_query_vector(&query_vector)?;

        let results = rank(&query_vector, &self.store, top_k);

        for (position, result) in results.iter().enumerate() {
            tracing::debug!(
                rank = position + 1,
                index = result.index,
                source = result.chunk.source_document(),
                score = result.score,
                "Retrieved chunk"
            );
        }

        Ok(results)
    }

    /// Retrieve with the default parameters and apply the relevance threshold
    pub async fn search(&self, query: &str) -> std::result::Result<Vec<ScoredChunk<'_>>, RetrievalError> {
        self.search_with_params(query, &self.default_params).await
    }

    pub async fn search_with_params(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> std::result::Result<Vec<ScoredChunk<'_>>, RetrievalError> {
        let ranked = self.retrieve(query, params.top_k).await?;
        Ok(RelevanceFilter::new(params.min_score).apply(ranked))
    }

    fn check_query_vector(&self, vector: &[f32]) -> std::result::Result<(), RetrievalError> {
        if let Some(expected) = self.store.dimension() {
            if vector.len() != expected {
                return Err(RetrievalError::DimensionMismatch {
                    expected,
                    found: vector.len(),
                });
            }
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(RetrievalError::Embedding(
                "Embedder returned a non-finite value".to_string(),
            ));
        }
        Ok(())
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn default_params(&self) -> &SearchParams {
        &self.default_params
    }
}
