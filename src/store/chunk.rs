use serde::{Deserialize, Serialize};

/// A span of source-document text paired with its embedding vector.
///
/// Created once during ingestion and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    source_document: String,
    text: String,
    embedding: Vec<f32>,
}

impl Chunk {
    pub fn new(source_document: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            source_document: source_document.into(),
            text: text.into(),
            embedding,
        }
    }

    /// Identifier of the document the text was cut from (usually a file name)
    pub fn source_document(&self) -> &str {
        &self.source_document
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// First `max_chars` characters of the text, with an ellipsis when cut
    pub fn preview(&self, max_chars: usize) -> String {
        preview_text(&self.text, max_chars)
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut
pub fn preview_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
