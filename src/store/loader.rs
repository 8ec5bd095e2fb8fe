// Chunk file loader with precomputed embedding norms
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::LoadError;
use crate::rag::similarity::vector_norm;
use crate::store::chunk::Chunk;

const UNKNOWN_SOURCE: &str = "unknown";

/// Record as persisted by ingestion. Every field is optional here so that a
/// missing field is reported with the offending record index.
#[derive(Debug, Deserialize)]
struct ChunkRecord {
    #[serde(default, alias = "pdf")]
    source_document: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// In-memory, read-only collection of chunks in load order
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    norms: Vec<f64>,
    dimension: Option<usize>,
    source: Option<PathBuf>,
}

impl ChunkStore {
    /// Load the whole chunk file eagerly
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut store = Self::from_json_str(&contents)?;
        store.source = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            chunks = store.len(),
            dimension = store.dimension.unwrap_or(0),
            "Loaded chunk store"
        );

        Ok(store)
    }

    /// Parse a JSON array of chunk records
    pub fn from_json_str(contents: &str) -> Result<Self, LoadError> {
        let records: Vec<ChunkRecord> = serde_json::from_str(contents)?;

        let mut chunks = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let text = record
                .text
                .ok_or(LoadError::MissingField { index, field: "text" })?;
            let embedding = record
                .embedding
                .ok_or(LoadError::MissingField { index, field: "embedding" })?;
            let source = record
                .source_document
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

            chunks.push(Chunk::new(source, text, embedding));
        }

        Self::from_chunks(chunks)
    }

    /// Validate chunks and cache their norms
    pub fn from_chunks(chunks: Vec<Chunk>) -> Result<Self, LoadError> {
        let mut dimension: Option<usize> = None;
        let mut norms = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            if chunk.text().trim().is_empty() {
                return Err(LoadError::EmptyText { index });
            }
            if chunk.embedding().is_empty() {
                return Err(LoadError::EmptyEmbedding { index });
            }
            if chunk.embedding().iter().any(|v| !v.is_finite()) {
                return Err(LoadError::NonFiniteValue { index });
            }

            match dimension {
                None => dimension = Some(chunk.dimension()),
                Some(expected) if expected != chunk.dimension() => {
                    return Err(LoadError::DimensionMismatch {
                        index,
                        expected,
                        found: chunk.dimension(),
                    });
                }
                Some(_) => {}
            }

            norms.push(vector_norm(chunk.embedding()));
        }

        Ok(Self {
            chunks,
            norms,
            dimension,
            source: None,
        })
    }

    /// Store with no chunks; retrieval against it always yields nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality shared by every chunk (None when empty)
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Cached L2 norm of the chunk at `index`
    pub fn norm(&self, index: usize) -> Option<f64> {
        self.norms.get(index).copied()
    }

    /// Chunks paired with their cached norms, in load order
    pub fn iter(&self) -> impl Iterator<Item = (&Chunk, f64)> + '_ {
        self.chunks.iter().zip(self.norms.iter().copied())
    }

    /// Number of chunks per source document, in first-seen order
    pub fn document_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for chunk in &self.chunks {
            match counts.iter_mut().find(|(doc, _)| *doc == chunk.source_document()) {
                Some((_, count)) => *count += 1,
                None => counts.push((chunk.source_document(), 1)),
            }
        }
        counts
    }

    /// Path the store was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TWO_CHUNKS: &str = r#"[
        {"source_document": "a.pdf", "text": "Telnet is a telecom partner", "embedding": [1, 0]},
        {"source_document": "b.pdf", "text": "weather is sunny", "embedding": [0, 1]}
    ]"#;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TWO_CHUNKS.as_bytes()).unwrap();

        let store = ChunkStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.source(), Some(file.path()));
        assert_eq!(store.get(0).unwrap().source_document(), "a.pdf");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ChunkStore::load("/definitely/not/here/chunks.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = ChunkStore::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_top_level_object_rejected() {
        let err = ChunkStore::from_json_str(r#"{"text": "x", "embedding": [1]}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_missing_text_field() {
        let err = ChunkStore::from_json_str(r#"[{"source_document": "a.pdf", "embedding": [1, 0]}]"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingField { index: 0, field: "text" }));
    }

    #[test]
    fn test_missing_embedding_field() {
        let json = r#"[
            {"text": "ok", "embedding": [1, 0]},
            {"text": "no vector"}
        ]"#;
        let err = ChunkStore::from_json_str(json).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { index: 1, field: "embedding" }));
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = ChunkStore::from_json_str(r#"[{"text": "   ", "embedding": [1]}]"#).unwrap_err();
        assert!(matches!(err, LoadError::EmptyText { index: 0 }));
    }

    #[test]
    fn test_empty_embedding_rejected() {
        let err = ChunkStore::from_json_str(r#"[{"text": "x", "embedding": []}]"#).unwrap_err();
        assert!(matches!(err, LoadError::EmptyEmbedding { index: 0 }));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let json = r#"[
            {"text": "a", "embedding": [1, 0, 0]},
            {"text": "b", "embedding": [1, 0]}
        ]"#;
        let err = ChunkStore::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DimensionMismatch { index: 1, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_legacy_pdf_field_accepted() {
        let store =
            ChunkStore::from_json_str(r#"[{"pdf": "legacy.pdf", "text": "x", "embedding": [1]}]"#)
                .unwrap();
        assert_eq!(store.get(0).unwrap().source_document(), "legacy.pdf");
    }

    #[test]
    fn test_missing_source_defaults() {
        let store = ChunkStore::from_json_str(r#"[{"text": "x", "embedding": [1]}]"#).unwrap();
        assert_eq!(store.get(0).unwrap().source_document(), UNKNOWN_SOURCE);
    }

    #[test]
    fn test_norms_precomputed() {
        let store = ChunkStore::from_json_str(r#"[{"text": "x", "embedding": [3, 4]}]"#).unwrap();
        assert!((store.norm(0).unwrap() - 5.0).abs() < 1e-6);
        assert_eq!(store.iter().count(), 1);
    }

    #[test]
    fn test_empty_array_gives_empty_store() {
        let store = ChunkStore::from_json_str("[]").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn test_document_counts() {
        let json = r#"[
            {"source_document": "a.pdf", "text": "1", "embedding": [1]},
            {"source_document": "b.pdf", "text": "2", "embedding": [1]},
            {"source_document": "a.pdf", "text": "3", "embedding": [1]}
        ]"#;
        let store = ChunkStore::from_json_str(json).unwrap();
        assert_eq!(store.document_counts(), vec![("a.pdf", 2), ("b.pdf", 1)]);
    }
}
