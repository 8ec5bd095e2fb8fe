// Cosine similarity ranking over the chunk store
use serde::Serialize;
use std::cmp::Ordering;

use crate::store::{Chunk, ChunkStore};

/// Added to the cosine denominator so a zero vector scores 0 instead of NaN
pub const EPSILON: f64 = 1e-10;

/// Anything carrying a similarity score
pub trait Scored {
    fn score(&self) -> f32;
}

/// A chunk paired with its similarity to the current query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredChunk<'a> {
    /// Position of the chunk in load order
    pub index: usize,
    pub chunk: &'a Chunk,
    pub score: f32,
}

impl Scored for ScoredChunk<'_> {
    fn score(&self) -> f32 {
        self.score
    }
}

// Sums are accumulated in f64: squares of large finite f32 components
// overflow f32 long before they overflow f64.

pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

/// L2 magnitude
pub fn vector_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt()
}

/// Cosine similarity using norms the caller already has
pub fn cosine_with_norms(a: &[f32], a_norm: f64, b: &[f32], b_norm: f64) -> f32 {
    (dot(a, b) / (a_norm * b_norm + EPSILON)) as f32
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_with_norms(a, vector_norm(a), b, vector_norm(b))
}

/// Descending by score; NaN sorts after every number
fn by_score_desc(a: &ScoredChunk<'_>, b: &ScoredChunk<'_>) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or_else(|| a.score.is_nan().cmp(&b.score.is_nan()))
}

/// Score every chunk against `query` and keep the `top_k` best.
///
/// Full scan, O(n·d). Results are sorted by score descending; equal scores
/// keep load order. The store is only read. `query` must have the store's
/// dimensionality.
pub fn rank<'a>(query: &[f32], store: &'a ChunkStore, top_k: usize) -> Vec<ScoredChunk<'a>> {
    if top_k == 0 || store.is_empty() {
        return Vec::new();
    }

    let query_norm = vector_norm(query);

    let mut scored: Vec<ScoredChunk<'a>> = store
        .iter()
        .enumerate()
        .map(|(index, (chunk, norm))| ScoredChunk {
            index,
            chunk,
            score: cosine_with_norms(query, query_norm, chunk.embedding(), norm),
        })
        .collect();

    // sort_by is stable, which gives the load-order tie break
    scored.sort_by(by_score_desc);
    scored.truncate(top_k);

    scored
}
