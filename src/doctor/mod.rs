//! Doctor command for system diagnostics
//!
//! Checks everything a chat session depends on: the Ollama API, the
//! configured models and the chunk file.

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::bootstrap::{model_matches, Bootstrap};
use crate::cli::Config;
use crate::embedding::EmbeddingBackend;
use crate::store::ChunkStore;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass(String),
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    bootstrap: Bootstrap,
    chat_model: String,
    light_model: Option<String>,
    embedding: (EmbeddingBackend, String, Option<usize>),
    chunk_file: PathBuf,
}

impl Doctor {
    pub fn new(config: &Config) -> Self {
        Self {
            bootstrap: Bootstrap::new(&config.ollama_url()),
            chat_model: config.ollama.chat_model.clone(),
            light_model: config.ollama.light_model.clone(),
            embedding: (
                config.embedding.backend,
                config.embedding.model.clone(),
                config.embedding.dimension,
            ),
            chunk_file: config.chunk_file(),
        }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = Vec::new();

        let installed = if self.bootstrap.check_ollama_running().await {
            checks.push(HealthCheck::new(
                "Ollama API",
                HealthStatus::Pass(self.bootstrap.ollama_url().to_string()),
            ));
            match self.bootstrap.list_models().await {
                Ok(models) => Some(models),
                Err(e) => {
                    checks.push(HealthCheck::new(
                        "Models",
                        HealthStatus::Fail(format!("Cannot list models: {}", e)),
                    ));
                    None
                }
            }
        } else {
            checks.push(HealthCheck::new(
                "Ollama API",
                HealthStatus::Fail(format!("Not reachable at {}", self.bootstrap.ollama_url())),
            ));
            None
        };

        if let Some(installed) = &installed {
            checks.push(model_check("Chat model", &self.chat_model, installed));
            if let Some(light) = &self.light_model {
                checks.push(model_check("Light model", light, installed));
            }
            if self.embedding.0 == EmbeddingBackend::Ollama {
                checks.push(model_check("Embedding model", &self.embedding.1, installed));
            }
        }

        if self.embedding.0 == EmbeddingBackend::Candle {
            checks.push(HealthCheck::new(
                "Embedding model",
                HealthStatus::Pass(format!("{} (local, downloaded on first use)", self.embedding.1)),
            ));
        }

        checks.push(check_chunk_file(&self.chunk_file, self.embedding.2));
        checks
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "docchat diagnostics".bold());
        println!("{:<18} {}", "Check", "Status");
        println!("{}", "=".repeat(60));

        for check in checks {
            let line = match &check.status {
                HealthStatus::Pass(msg) => format!("PASS {}", msg).green(),
                HealthStatus::Warn(msg) => format!("WARN {}", msg).yellow(),
                HealthStatus::Fail(msg) => format!("FAIL {}", msg).red(),
            };
            println!("{:<18} {}", check.name, line);
        }

        println!();
    }

    /// True when no check failed
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

fn model_check(name: &str, model: &str, installed: &[String]) -> HealthCheck {
    if installed.iter().any(|m| model_matches(m, model)) {
        HealthCheck::new(name, HealthStatus::Pass(model.to_string()))
    } else {
        HealthCheck::new(
            name,
            HealthStatus::Fail(format!("{} not pulled (run `ollama pull {}`)", model, model)),
        )
    }
}

/// Load the chunk file and compare its dimension with the configured one
pub fn check_chunk_file(path: &Path, expected_dimension: Option<usize>) -> HealthCheck {
    match ChunkStore::load(path) {
        Ok(store) if store.is_empty() => HealthCheck::new(
            "Chunk file",
            HealthStatus::Warn(format!("{} holds no chunks", path.display())),
        ),
        Ok(store) => match (store.dimension(), expected_dimension) {
            (Some(found), Some(expected)) if found != expected => HealthCheck::new(
                "Chunk file",
                HealthStatus::Fail(format!(
                    "{}-dimensional embeddings, configured embedder produces {}",
                    found, expected
                )),
            ),
            (dimension, _) => HealthCheck::new(
                "Chunk file",
                HealthStatus::Pass(format!(
                    "{} chunks from {} documents, dimension {}",
                    store.len(),
                    store.document_counts().len(),
                    dimension.unwrap_or(0)
                )),
            ),
        },
        Err(e) => HealthCheck::new("Chunk file", HealthStatus::Fail(e.to_string())),
    }
}
