//! Ollama detection
//!
//! Checks that the Ollama API answers and that the configured models are
//! pulled before the chat session starts.

use crate::errors::{DocChatError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Ollama reachability and model checks
pub struct Bootstrap {
    client: Client,
    ollama_url: String,
}

/// Ollama API tags response
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

/// Bootstrap check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapStatus {
    Ready,
    OllamaNotRunning,
    ModelNotAvailable(String),
}

impl Bootstrap {
    pub fn new(ollama_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            ollama_url: ollama_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check if Ollama API is reachable
    pub async fn check_ollama_running(&self) -> bool {
        let url = format!("{}/api/tags", self.ollama_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Ollama not reachable");
                false
            }
        }
    }

    /// Names of the pulled models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.ollama_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DocChatError::OllamaApiError(format!("Failed to query models: {}", e)))?;

        if !response.status().is_success() {
            return Err(DocChatError::OllamaApiError(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| DocChatError::OllamaApiError(format!("Failed to parse response: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    pub async fn check_model_available(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|name| model_matches(name, model)))
    }

    /// Ollama first, then every model in `models`
    pub async fn check(&self, models: &[&str]) -> Result<BootstrapStatus> {
        if !self.check_ollama_running().await {
            return Ok(BootstrapStatus::OllamaNotRunning);
        }

        for model in models {
            if !self.check_model_available(model).await? {
                return Ok(BootstrapStatus::ModelNotAvailable(model.to_string()));
            }
        }

        Ok(BootstrapStatus::Ready)
    }

    pub fn ollama_url(&self) -> &str {
        &self.ollama_url
    }

    pub fn show_ollama_install_instructions() {
        eprintln!("\nOllama not found or not running!");
        eprintln!("\nInstallation:");
        eprintln!("   Linux:   curl -fsSL https://ollama.com/install.sh | sh");
        eprintln!("   macOS:   brew install ollama");
        eprintln!("\nStart Ollama:");
        eprintln!("   ollama serve");
        eprintln!();
    }

    pub fn show_model_pull_instructions(model: &str) {
        eprintln!("\nModel '{}' not found!", model);
        eprintln!("\nTo download this model, run:");
        eprintln!("   ollama pull {}", model);
        eprintln!("\nOr choose a different model with:");
        eprintln!("   docchat --model <model>");
        eprintln!();
    }
}

/// `llama3` matches the installed `llama3:latest`
pub fn model_matches(installed: &str, requested: &str) -> bool {
    installed == requested
        || (!requested.contains(':') && installed.strip_suffix(":latest") == Some(requested))
}

/// Exit code when Ollama or a model is missing
pub const EXIT_CODE_SETUP_NEEDED: i32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_creation() {
        let bootstrap = Bootstrap::new("http://localhost:11434/");
        assert_eq!(bootstrap.ollama_url(), "http://localhost:11434");
    }

    #[test]
    fn test_model_matches() {
        assert!(model_matches("llama3:latest", "llama3"));
        assert!(model_matches("llama3:8b", "llama3:8b"));
        assert!(!model_matches("llama3:8b", "llama3"));
        assert!(!model_matches("llama3:latest", "llama3:8b"));
        assert!(!model_matches("mistral:latest", "llama3"));
    }

    #[test]
    fn test_tags_response_parsing() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models": [{"name": "llama3:latest", "size": 1, "digest": "abc"}]}"#,
        )
        .unwrap();
        assert_eq!(tags.models[0].name, "llama3:latest");
    }

    #[tokio::test]
    async fn test_unreachable_ollama() {
        let bootstrap = Bootstrap::new("http://127.0.0.1:9");
        assert!(!bootstrap.check_ollama_running().await);
        assert_eq!(
            bootstrap.check(&["llama3"]).await.unwrap(),
            BootstrapStatus::OllamaNotRunning
        );
    }
}
