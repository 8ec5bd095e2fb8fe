//! Error types for DocChat
//!
//! Load-time failures are fatal and stop startup; retrieval failures are
//! scoped to a single query and surface as a fallback message.

use thiserror::Error;

/// Failure to load the persisted chunk file
#[derive(Error, Debug)]
pub enum LoadError {
    /// Chunk file missing or unreadable
    #[error("Cannot read chunk file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Chunk file is not a JSON array of records
    #[error("Malformed chunk file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record lacks `text` or `embedding`
    #[error("Record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// A record has blank text
    #[error("Record {index} has empty text")]
    EmptyText { index: usize },

    /// A record has a zero-length embedding
    #[error("Record {index} has an empty embedding")]
    EmptyEmbedding { index: usize },

    /// A record's embedding contains NaN or infinity
    #[error("Record {index} has a non-finite embedding value")]
    NonFiniteValue { index: usize },

    /// Embedding dimensionality differs from the first record
    #[error("Record {index} has embedding dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Failure while answering a single query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    /// Embedding backend could not produce a vector
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Query vector does not match the store's dimensionality
    #[error("Query embedding has dimension {found}, store expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Main error type for DocChat
#[derive(Error, Debug)]
pub enum DocChatError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApiError(String),

    /// Embedding model setup errors
    #[error("Embedding model error: {0}")]
    ModelError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for DocChat operations
pub type Result<T> = std::result::Result<T, DocChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = LoadError::DimensionMismatch {
            index: 3,
            expected: 384,
            found: 768,
        };
        let msg = err.to_string();
        assert!(msg.contains("Record 3"));
        assert!(msg.contains("384"));
        assert!(msg.contains("768"));
    }

    #[test]
    fn test_missing_field_display() {
        let err = LoadError::MissingField {
            index: 0,
            field: "embedding",
        };
        assert!(err.to_string().contains("`embedding`"));
    }

    #[test]
    fn test_retrieval_error_wraps_into_docchat_error() {
        let err: DocChatError = RetrievalError::Embedding("backend down".to_string()).into();
        assert!(matches!(err, DocChatError::Retrieval(_)));
        assert!(err.to_string().contains("backend down"));
    }
}
