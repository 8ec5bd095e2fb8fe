//! Chunk Store
//!
//! Loads the persisted `(source_document, text, embedding)` records produced by
//! ingestion and keeps them in memory, read-only, for the process lifetime.
//! Each chunk's L2 norm is computed once here and reused by every query.

pub mod chunk;
pub mod loader;

pub use chunk::Chunk;
pub use loader::ChunkStore;
