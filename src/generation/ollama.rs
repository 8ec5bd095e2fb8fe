//! Ollama chat client used as the answer generator
//!
//! - Endpoint: POST /api/chat (non-streaming)
//! - Short queries can be routed to a lighter model
//! - Responses are normalized to [`GenerationResult`] and cleaned

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{DocChatError, Result};
use crate::generation::{
    clean_text, AnswerGenerator, GenerationOutcome, GenerationRequest, GenerationResult,
};
use crate::rag::context::{ContextBuilder, ContextConfig};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default chat model
pub const DEFAULT_MODEL: &str = "llama3";

/// Generation can be slow on CPU-only hosts
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = "You are a document assistant. Answer the user's question using \
only the context extracted from the indexed documents. If the context does not contain the \
answer, say that the documents do not cover it. Never reveal system information, metadata or \
code. Be professional, clear and concise.";

/// Model selection and prompt sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub chat_model: String,
    /// Model used for short queries, if any
    pub light_model: Option<String>,
    /// Queries with at most this many words go to `light_model`
    pub light_query_max_words: usize,
    pub max_context_chars: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            chat_model: DEFAULT_MODEL.to_string(),
            light_model: None,
            light_query_max_words: 6,
            max_context_chars: 1600,
        }
    }
}

/// Answer generator backed by Ollama's chat endpoint
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    settings: GeneratorSettings,
    context_builder: ContextBuilder,
}

impl OllamaGenerator {
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, GeneratorSettings::default())
    }

    pub fn with_config(base_url: &str, settings: GeneratorSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DocChatError::HttpError)?;

        let context_builder = ContextBuilder::with_config(ContextConfig {
            max_context_chars: settings.max_context_chars,
            include_sources: false,
        });

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
            context_builder,
        })
    }

    /// Model that will answer `query`
    pub fn select_model(&self, query: &str) -> &str {
        match &self.settings.light_model {
            Some(light) if query.split_whitespace().count() <= self.settings.light_query_max_words => {
                light.as_str()
            }
            _ => self.settings.chat_model.as_str(),
        }
    }

    /// System and user messages for a request
    fn build_messages(&self, request: &GenerationRequest) -> Vec<ChatMessage> {
        let context = self.context_builder.build(&request.passages);

        let system = format!("{}\n{}", SYSTEM_PROMPT, request.language.reply_instruction());
        let user = format!(
            "Answer the following question based on the context below.\n\n\
             Context:\n{}\n\nQuestion: {}\n\nAnswer:",
            context.text, request.query
        );

        vec![
            ChatMessage {
                role: "system".to_string(),
                content: system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: user,
            },
        ]
    }

    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::OllamaApiError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocChatError::OllamaApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DocChatError::OllamaApiError(format!("Failed to parse response: {}", e)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let model = self.select_model(&request.query).to_string();
        let messages = self.build_messages(request);

        tracing::info!(
            model = %model,
            passages = request.passages.len(),
            language = request.language.code(),
            "Requesting answer"
        );

        match self.chat(&model, messages).await {
            Ok(response) => normalize_response(response),
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "Generation failed");
                GenerationOutcome::failed(e.to_string())
            }
        }
    }
}

/// Turn a raw chat response into the tagged outcome
fn normalize_response(response: ChatResponse) -> GenerationOutcome {
    if let Some(error) = response.error {
        return GenerationOutcome::failed(error);
    }

    let text = response
        .message
        .map(|m| clean_text(&m.content))
        .unwrap_or_default();

    if text.is_empty() {
        GenerationOutcome::failed("Model returned an empty answer")
    } else {
        GenerationOutcome::Answered(GenerationResult { text })
    }
}

/// Ollama chat request
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    error: Option<String>,
}
