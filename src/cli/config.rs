//! Configuration management for docchat
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.docchat/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::args::Args;
use crate::embedding::EmbeddingBackend;
use crate::errors::{DocChatError, Result};
use crate::generation::ollama::GeneratorSettings;
use crate::ingest::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::rag::SearchParams;

/// Complete configuration for docchat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub ingest: IngestConfig,
    pub paths: PathsConfig,
}

/// Ollama connection and model routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub chat_model: String,
    /// Lighter model for short queries
    pub light_model: Option<String>,
    pub light_query_max_words: usize,
}

/// Embedding backend; must match the model the chunk file was built with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Hugging Face model id (candle) or Ollama model name (ollama)
    pub model: String,
    /// Declared output dimension, checked against the chunk file at startup
    pub dimension: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub chunk_file: String,
    pub top_k: usize,
    pub min_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Character budget of the context block sent to the model
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub history_file: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            chat_model: crate::generation::DEFAULT_MODEL.to_string(),
            light_model: None,
            light_query_max_words: 6,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Candle,
            model: crate::embedding::engine::DEFAULT_MODEL_ID.to_string(),
            dimension: None,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let params = SearchParams::default();
        Self {
            chunk_file: "chunks_data.json".to_string(),
            top_k: params.top_k,
            min_score: params.min_score,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 1600,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            history_file: "~/.docchat/history".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(config_path) => Self::load_from_file(config_path),
            None => Self::load_default(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocChatError::ConfigError(format!("Failed to read config {}: {}", path.display(), e)))?;

        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| DocChatError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// ~/.docchat/config.toml when present, built-in defaults otherwise
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".docchat").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(DocChatError::ConfigError(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if !(-1.0..=1.0).contains(&self.retrieval.min_score) {
            return Err(DocChatError::ConfigError(format!(
                "min_score must be between -1.0 and 1.0, got {}",
                self.retrieval.min_score
            )));
        }

        if self.generation.max_context_chars == 0 {
            return Err(DocChatError::ConfigError(
                "max_context_chars must be greater than 0".to_string(),
            ));
        }

        if self.ingest.chunk_size == 0 {
            return Err(DocChatError::ConfigError(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(DocChatError::ConfigError(
                "chunk_overlap must be less than chunk_size".to_string(),
            ));
        }

        if self.embedding.dimension == Some(0) {
            return Err(DocChatError::ConfigError(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        if self.ollama.chat_model.trim().is_empty() {
            return Err(DocChatError::ConfigError(
                "chat_model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Command-line flags win over file values
    pub fn apply_args(&mut self, args: &Args) -> Result<()> {
        if let Some(model) = &args.model {
            self.ollama.chat_model = model.clone();
        }
        if let Some(host) = &args.host {
            self.ollama.host = host.clone();
        }
        if let Some(port) = args.port {
            self.ollama.port = port;
        }
        if let Some(chunks) = &args.chunks {
            self.retrieval.chunk_file = chunks.to_string_lossy().into_owned();
        }
        if let Some(top_k) = args.top_k {
            self.retrieval.top_k = top_k;
        }
        if let Some(min_score) = args.min_score {
            self.retrieval.min_score = min_score;
        }
        self.validate()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DocChatError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            top_k: self.retrieval.top_k,
            min_score: self.retrieval.min_score,
        }
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            chat_model: self.ollama.chat_model.clone(),
            light_model: self.ollama.light_model.clone(),
            light_query_max_words: self.ollama.light_query_max_words,
            max_context_chars: self.generation.max_context_chars,
        }
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn chunk_file(&self) -> PathBuf {
        Self::expand_path(&self.retrieval.chunk_file)
    }

    pub fn history_file(&self) -> PathBuf {
        Self::expand_path(&self.paths.history_file)
    }
}
