// End-to-end chat pipeline: retrieve -> filter -> generate
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::RetrievalError;
use crate::generation::{
    AnswerGenerator, GenerationOutcome, GenerationRequest, Language, Passage, SmallTalk,
};
use crate::rag::filter::RelevanceFilter;
use crate::rag::retrieval::{RetrievalEngine, SearchParams};

/// What the user gets back for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatReply {
    /// Grounded answer with the passages it was built from
    Answered {
        text: String,
        passages: Vec<Passage>,
        language: Language,
    },
    /// Greeting, thanks or goodbye; neither retrieval nor the generator ran
    SmallTalk { kind: SmallTalk, language: Language },
    /// Nothing cleared the relevance threshold; the generator was not called
    NoRelevantDocuments { language: Language },
    /// Passages were found but the generator failed
    GenerationFailed {
        reason: String,
        passages: Vec<Passage>,
        language: Language,
    },
}

impl ChatReply {
    /// Text to show the user
    pub fn message(&self) -> &str {
        match self {
            ChatReply::Answered { text, .. } => text,
            ChatReply::SmallTalk { kind, language } => kind.reply(*language),
            ChatReply::NoRelevantDocuments { language } => language.no_relevant_documents(),
            ChatReply::GenerationFailed { language, .. } => language.generation_failed(),
        }
    }

    /// Passages that backed this reply (empty when none were relevant)
    pub fn passages(&self) -> &[Passage] {
        match self {
            ChatReply::Answered { passages, .. } | ChatReply::GenerationFailed { passages, .. } => passages.as_slice(),
            ChatReply::SmallTalk { .. } | ChatReply::NoRelevantDocuments { .. } => &[],
        }
    }

    pub fn language(&self) -> Language {
        match self {
            ChatReply::Answered { language, .. }
            | ChatReply::SmallTalk { language, .. }
            | ChatReply::NoRelevantDocuments { language }
            | ChatReply::GenerationFailed { language, .. } => *language,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, ChatReply::Answered { .. })
    }

    /// True for a goodbye
    pub fn ends_conversation(&self) -> bool {
        matches!(self, ChatReply::SmallTalk { kind, .. } if kind.ends_conversation())
    }
}

/// Question answering over the chunk store
pub struct ChatPipeline {
    engine: RetrievalEngine,
    generator: Arc<dyn AnswerGenerator>,
}

impl ChatPipeline {
    pub fn new(engine: RetrievalEngine, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { engine, generator }
    }

    /// Answer with the engine's default search parameters
    pub async fn answer(&self, query: &str) -> Result<ChatReply, RetrievalError> {
        let params = *self.engine.default_params();
        self.answer_with_params(query, &params).await
    }

    /// Answer with explicit top-k and threshold.
    ///
    /// Small talk is answered before retrieval. An empty passage set
    /// short-circuits before any generator call.
    pub async fn answer_with_params(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<ChatReply, RetrievalError> {
        if let Some((kind, language)) = SmallTalk::detect(query) {
            tracing::debug!(?kind, "Small talk, skipping retrieval");
            return Ok(ChatReply::SmallTalk { kind, language });
        }

        let language = Language::detect(query);

        let ranked = self.engine.retrieve(query, params.top_k).await?;
        let retrieved = ranked.len();
        let relevant = RelevanceFilter::new(params.min_score).apply(ranked);

        tracing::info!(
            retrieved,
            relevant = relevant.len(),
            min_score = params.min_score,
            "Retrieval complete"
        );

        if relevant.is_empty() {
            return Ok(ChatReply::NoRelevantDocuments { language });
        }

        let passages: Vec<Passage> = relevant.iter().map(Passage::from).collect();
        let request = GenerationRequest {
            query: query.to_string(),
            passages,
            language,
        };

        let reply = match self.generator.generate(&request).await {
            GenerationOutcome::Answered(result) => ChatReply::Answered {
                text: result.text,
                passages: request.passages,
                language,
            },
            GenerationOutcome::Failed { reason } => ChatReply::GenerationFailed {
                reason,
                passages: request.passages,
                language,
            },
        };

        Ok(reply)
    }

    /// User-facing text for a failed retrieval
    pub fn fallback_message(query: &str, error: &RetrievalError) -> &'static str {
        tracing::warn!(error = %error, "Retrieval failed");
        Language::detect(query).retrieval_failed()
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn default_params(&self) -> &SearchParams {
        self.engine.default_params()
    }
}
