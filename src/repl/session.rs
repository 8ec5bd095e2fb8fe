//! Chat session state: search parameters, question history and the
//! passages behind the last answer

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;

use crate::generation::Passage;
use crate::rag::{ChatReply, SearchParams};

/// Maximum number of exchanges kept in history
const MAX_HISTORY_SIZE: usize = 1000;

/// How a question was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeStatus {
    Answered,
    SmallTalk,
    NoRelevantDocuments,
    GenerationFailed,
    RetrievalFailed,
}

/// One question and what came back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub status: ExchangeStatus,
    pub duration_ms: u64,
}

/// Per-session mutable state behind the REPL
pub struct SessionState {
    params: SearchParams,
    history: VecDeque<Exchange>,
    last_passages: Vec<Passage>,
    started: Instant,
}

impl SessionState {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            history: VecDeque::new(),
            last_passages: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_top_k(&mut self, top_k: usize) {
        self.params.top_k = top_k;
    }

    pub fn set_min_score(&mut self, min_score: f32) {
        self.params.min_score = min_score;
    }

    /// Remember a pipeline reply; its passages back `/sources`.
    /// Small talk leaves the previous sources in place.
    pub fn record_reply(&mut self, question: &str, reply: &ChatReply, duration_ms: u64) {
        let status = match reply {
            ChatReply::Answered { .. } => ExchangeStatus::Answered,
            ChatReply::SmallTalk { .. } => ExchangeStatus::SmallTalk,
            ChatReply::NoRelevantDocuments { .. } => ExchangeStatus::NoRelevantDocuments,
            ChatReply::GenerationFailed { .. } => ExchangeStatus::GenerationFailed,
        };
        if status != ExchangeStatus::SmallTalk {
            self.last_passages = reply.passages().to_vec();
        }
        self.push(Exchange {
            question: question.to_string(),
            answer: reply.message().to_string(),
            status,
            duration_ms,
        });
    }

    /// Remember a question whose retrieval failed
    pub fn record_failure(&mut self, question: &str, message: &str, duration_ms: u64) {
        self.last_passages.clear();
        self.push(Exchange {
            question: question.to_string(),
            answer: message.to_string(),
            status: ExchangeStatus::RetrievalFailed,
            duration_ms,
        });
    }

    fn push(&mut self, exchange: Exchange) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(exchange);
    }

    /// Most recent `limit` exchanges, oldest first
    pub fn recent(&self, limit: usize) -> Vec<&Exchange> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).collect()
    }

    pub fn last_passages(&self) -> &[Passage] {
        &self.last_passages
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Forget history and sources, keep parameters
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_passages.clear();
    }
}
