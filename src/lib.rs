//! docchat - retrieval-augmented chat over a local document collection
//!
//! # Architecture
//!
//! - **store**: chunk file loading and validation (immutable after load)
//! - **embedding**: text to vector, local candle model or Ollama
//! - **rag**: cosine ranking, relevance filter, context assembly, chat pipeline
//! - **generation**: answer generation through Ollama's chat endpoint
//! - **ingest**: building the chunk file from plain-text documents
//! - **cli / repl / doctor / bootstrap**: the command-line surface

pub mod errors;
pub use errors::{DocChatError, LoadError, Result, RetrievalError};

pub mod embedding;
pub mod generation;
pub mod ingest;
pub mod rag;
pub mod store;

pub mod bootstrap;
pub mod cli;
pub mod doctor;
pub mod logging;
pub mod repl;

pub use rag::{ChatPipeline, ChatReply, RetrievalEngine, SearchParams};
pub use store::{Chunk, ChunkStore};
