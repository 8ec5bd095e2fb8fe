// Relevance threshold applied after ranking
use serde::{Deserialize, Serialize};

use crate::rag::similarity::Scored;

/// Keeps results whose score is strictly above `min_score`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceFilter {
    min_score: f32,
}

impl RelevanceFilter {
    pub fn new(min_score: f32) -> Self {
        Self { min_score }
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    /// Drop results at or below the threshold, preserving order
    pub fn apply<T: Scored>(&self, results: Vec<T>) -> Vec<T> {
        let before = results.len();
        let kept: Vec<T> = results
            .into_iter()
            .filter(|r| r.score() > self.min_score)
            .collect();

        tracing::debug!(
            min_score = self.min_score,
            before,
            after = kept.len(),
            "Applied relevance filter"
        );

        kept
    }
}

/// Free-function form of [`RelevanceFilter::apply`]
pub fn filter_by_score<T: Scored>(results: Vec<T>, min_score: f32) -> Vec<T> {
    RelevanceFilter::new(min_score).apply(results)
}
