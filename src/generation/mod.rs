//! Answer generation boundary
//!
//! Everything past retrieval talks to the language model through
//! [`AnswerGenerator`]. Backend responses are normalized into
//! [`GenerationResult`] at the adapter, and failures come back as a tagged
//! [`GenerationOutcome::Failed`] instead of error text posing as an answer.

pub mod language;
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use language::{Language, SmallTalk};
pub use ollama::{OllamaGenerator, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

use crate::rag::similarity::{Scored, ScoredChunk};

/// A retrieved passage handed to the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub score: f32,
    pub source_document: String,
}

impl From<&ScoredChunk<'_>> for Passage {
    fn from(scored: &ScoredChunk<'_>) -> Self {
        Self {
            text: scored.chunk.text().to_string(),
            score: scored.score,
            source_document: scored.chunk.source_document().to_string(),
        }
    }
}

impl Scored for Passage {
    fn score(&self) -> f32 {
        self.score
    }
}

/// Everything the generator needs for one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub query: String,
    pub passages: Vec<Passage>,
    pub language: Language,
}

/// Normalized generator output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
}

/// Outcome of a generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    Answered(GenerationResult),
    Failed { reason: String },
}

impl GenerationOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        GenerationOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, GenerationOutcome::Answered(_))
    }
}

/// Produces a natural-language answer grounded in the given passages
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome;
}

/// Trim every line and drop blank ones
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Chunk;

    #[test]
    fn test_clean_text() {
        let raw = "\n  Telnet is a partner.  \n\n\n   It builds telecom software.\n  ";
        assert_eq!(
            clean_text(raw),
            "Telnet is a partner.\nIt builds telecom software."
        );
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text("  \n \n"), "");
    }

    #[test]
    fn test_passage_from_scored_chunk() {
        let chunk = Chunk::new("a.pdf", "Telnet", vec![1.0]);
        let scored = ScoredChunk {
            index: 0,
            chunk: &chunk,
            score: 0.75,
        };
        let passage = Passage::from(&scored);
        assert_eq!(passage.text, "Telnet");
        assert_eq!(passage.source_document, "a.pdf");
        assert_eq!(passage.score, 0.75);
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(!GenerationOutcome::failed("timeout").is_answered());
        let answered = GenerationOutcome::Answered(GenerationResult {
            text: "ok".to_string(),
        });
        assert!(answered.is_answered());
    }
}
