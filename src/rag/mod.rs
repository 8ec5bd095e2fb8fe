// RAG (Retrieval-Augmented Generation) pipeline
//
// Components:
// - Similarity: cosine scoring and top-k ranking over the chunk store
// - Filter: relevance threshold on ranked results
// - Retrieval Engine: query embedding + ranking
// - Context Builder: passage block for the generator prompt
// - Pipeline: retrieve -> filter -> generate, with the empty short-circuit

pub mod similarity;
pub mod filter;
pub mod retrieval;
pub mod context;
pub mod pipeline;

// Re-export key types
pub use similarity::{rank, ScoredChunk};
pub use filter::RelevanceFilter;
pub use retrieval::{RetrievalEngine, SearchParams};
pub use context::ContextBuilder;
pub use pipeline::{ChatPipeline, ChatReply};
