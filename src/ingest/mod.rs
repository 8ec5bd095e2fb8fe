//! Chunk file builder
//!
//! Reads plain-text documents (`.txt`/`.md`) from a directory, cuts them into
//! overlapping word windows, embeds every window and writes the JSON chunk
//! file the [`ChunkStore`](crate::store::ChunkStore) loads at startup.

pub mod chunker;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::embedding::Embedder;
use crate::errors::{DocChatError, Result};
use crate::store::Chunk;

pub use chunker::{chunk_words, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// Per-document ingestion summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub source_document: String,
    pub chunk_count: usize,
}

/// Result of ingesting a directory
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub chunks: Vec<Chunk>,
    pub documents: Vec<DocumentReport>,
}

impl IngestReport {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Builds chunks from documents with a given embedder
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_window(embedder, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }

    pub fn with_window(embedder: Arc<dyn Embedder>, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            embedder,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Chunk and embed one document's text
    pub async fn ingest_text(&self, source_document: &str, text: &str) -> Result<Vec<Chunk>> {
        let pieces = chunk_words(text, self.chunk_size, self.chunk_overlap);
        if pieces.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embedder.embed_batch(&pieces).await?;
        if embeddings.len() != pieces.len() {
            return Err(DocChatError::ModelError(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                pieces.len()
            )));
        }

        Ok(pieces
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| Chunk::new(source_document, text, embedding))
            .collect())
    }

    /// Ingest every supported file of `dir`, in file-name order
    pub async fn ingest_dir(&self, dir: impl AsRef<Path>) -> Result<IngestReport> {
        let files = list_documents(dir.as_ref())?;
        if files.is_empty() {
            tracing::warn!(dir = %dir.as_ref().display(), "No .txt or .md documents found");
        }

        let mut chunks = Vec::new();
        let mut documents = Vec::with_capacity(files.len());

        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let text = fs::read_to_string(&path)?;

            let document_chunks = self.ingest_text(&name, &text).await?;
            tracing::info!(document = %name, chunks = document_chunks.len(), "Ingested document");

            documents.push(DocumentReport {
                source_document: name,
                chunk_count: document_chunks.len(),
            });
            chunks.extend(document_chunks);
        }

        Ok(IngestReport { chunks, documents })
    }
}

/// Supported documents directly under `dir`, sorted by file name
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && supported {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Write chunks as a pretty-printed JSON array
pub fn write_chunk_file(path: impl AsRef<Path>, chunks: &[Chunk]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(chunks)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), chunks = chunks.len(), "Wrote chunk file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RetrievalError;
    use crate::store::ChunkStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Two-dimensional embedding from word count and text length
    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
            Ok(vec![text.split_whitespace().count() as f32, text.len() as f32])
        }

        fn dimension(&self) -> Option<usize> {
            Some(2)
        }

        fn name(&self) -> String {
            "length".to_string()
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
            Err(RetrievalError::Embedding("model missing".to_string()))
        }

        fn dimension(&self) -> Option<usize> {
            None
        }

        fn name(&self) -> String {
            "broken".to_string()
        }
    }

    #[tokio::test]
    async fn test_ingest_text() {
        let ingestor = Ingestor::with_window(Arc::new(LengthEmbedder), 3, 1);
        let chunks = ingestor.ingest_text("a.txt", "one two three four five").await.unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text(), "one two three");
        assert_eq!(chunks[1].text(), "three four five");
        assert_eq!(chunks[2].text(), "five");
        assert!(chunks.iter().all(|c| c.source_document() == "a.txt"));
        assert_eq!(chunks[0].embedding(), &[3.0, 13.0]);
    }

    #[tokio::test]
    async fn test_ingest_dir_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.md"), "beta document").unwrap();
        fs::write(dir.path().join("a.txt"), "alpha document").unwrap();
        fs::write(dir.path().join("c.pdf"), "binary").unwrap();
        fs::write(dir.path().join("empty.txt"), "   ").unwrap();

        let ingestor = Ingestor::new(Arc::new(LengthEmbedder));
        let report = ingestor.ingest_dir(dir.path()).await.unwrap();

        let names: Vec<_> = report.documents.iter().map(|d| d.source_document.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.md", "empty.txt"]);
        assert_eq!(report.chunk_count(), 2);
        assert_eq!(report.chunks[0].source_document(), "a.txt");
        assert_eq!(report.documents[2].chunk_count, 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let ingestor = Ingestor::new(Arc::new(BrokenEmbedder));
        let err = ingestor.ingest_text("a.txt", "some text").await.unwrap_err();
        assert!(matches!(err, DocChatError::Retrieval(_)));
    }

    #[tokio::test]
    async fn test_written_file_loads_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "Telnet is a telecom partner").unwrap();

        let report = Ingestor::new(Arc::new(LengthEmbedder))
            .ingest_dir(dir.path())
            .await
            .unwrap();
        let output = dir.path().join("out").join("chunks_data.json");
        write_chunk_file(&output, &report.chunks).unwrap();

        let store = ChunkStore::load(&output).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.chunks()[0].text(), "Telnet is a telecom partner");
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let err = list_documents(Path::new("/nonexistent/docchat/input")).unwrap_err();
        assert!(matches!(err, DocChatError::IoError(_)));
    }
}
