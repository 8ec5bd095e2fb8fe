//! Property tests for ranking, filtering and chunking

mod common;

use common::KeywordEmbedder;
use docchat::ingest::chunk_words;
use docchat::rag::similarity::{cosine_similarity, rank};
use docchat::rag::{RelevanceFilter, RetrievalEngine};
use docchat::{Chunk, ChunkStore};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use std::sync::Arc;

type Vec4 = (i8, i8, i8, i8);

fn to_vec(v: Vec4) -> Vec<f32> {
    vec![v.0 as f32, v.1 as f32, v.2 as f32, v.3 as f32]
}

fn store(vectors: &[Vec4]) -> ChunkStore {
    let chunks = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| Chunk::new(format!("doc{}", i % 3), format!("chunk {}", i), to_vec(*v)))
        .collect();
    ChunkStore::from_chunks(chunks).unwrap()
}

#[quickcheck]
fn rank_length_is_min_of_top_k_and_store(vectors: Vec<Vec4>, query: Vec4, top_k: u8) -> bool {
    let store = store(&vectors);
    let results = rank(&to_vec(query), &store, top_k as usize);
    results.len() == vectors.len().min(top_k as usize)
}

#[quickcheck]
fn rank_is_sorted_descending(vectors: Vec<Vec4>, query: Vec4) -> bool {
    let store = store(&vectors);
    let results = rank(&to_vec(query), &store, vectors.len());
    results.windows(2).all(|w| w[0].score >= w[1].score)
}

#[quickcheck]
fn rank_ties_keep_load_order(vectors: Vec<Vec4>, query: Vec4) -> bool {
    let store = store(&vectors);
    let results = rank(&to_vec(query), &store, vectors.len());
    results
        .windows(2)
        .all(|w| w[0].score != w[1].score || w[0].index < w[1].index)
}

#[quickcheck]
fn scores_are_finite_and_bounded(a: Vec4, b: Vec4) -> bool {
    let score = cosine_similarity(&to_vec(a), &to_vec(b));
    score.is_finite() && (-1.0 - 1e-5..=1.0 + 1e-5).contains(&score)
}

#[quickcheck]
fn scores_stay_bounded_for_large_components(a: Vec4, b: Vec4) -> bool {
    let scale = |v: Vec4| to_vec(v).into_iter().map(|x| x * 1e18).collect::<Vec<f32>>();
    let score = cosine_similarity(&scale(a), &scale(b));
    score.is_finite() && (-1.0 - 1e-5..=1.0 + 1e-5).contains(&score)
}

#[quickcheck]
fn filter_keeps_only_scores_above_threshold(vectors: Vec<Vec4>, query: Vec4, threshold: i8) -> bool {
    let store = store(&vectors);
    let min_score = threshold as f32 / 128.0;
    let kept = RelevanceFilter::new(min_score).apply(rank(&to_vec(query), &store, vectors.len()));
    kept.iter().all(|r| r.score > min_score)
}

#[quickcheck]
fn raising_threshold_never_adds_results(vectors: Vec<Vec4>, query: Vec4, low: i8, high: i8) -> TestResult {
    if low > high {
        return TestResult::discard();
    }
    let store = store(&vectors);
    let ranked = rank(&to_vec(query), &store, vectors.len());

    let loose = RelevanceFilter::new(low as f32 / 128.0).apply(ranked.clone());
    let strict = RelevanceFilter::new(high as f32 / 128.0).apply(ranked);

    let loose_indices: Vec<usize> = loose.iter().map(|r| r.index).collect();
    let strict_indices: Vec<usize> = strict.iter().map(|r| r.index).collect();
    TestResult::from_bool(
        strict_indices.len() <= loose_indices.len()
            && loose_indices[..strict_indices.len()] == strict_indices[..],
    )
}

#[quickcheck]
fn retrieval_is_idempotent(query: String) -> bool {
    let store = ChunkStore::from_chunks(vec![
        Chunk::new("a", "Telnet", vec![1.0, 0.0, 0.0]),
        Chunk::new("b", "weather", vec![0.0, 1.0, 0.0]),
        Chunk::new("c", "both", vec![1.0, 1.0, 0.0]),
    ])
    .unwrap();
    let engine = RetrievalEngine::new(Arc::new(store), Arc::new(KeywordEmbedder::new())).unwrap();

    let run = || -> Option<Vec<(usize, f32)>> {
        tokio_test::block_on(engine.retrieve(&query, 3))
            .ok()
            .map(|results| results.iter().map(|r| (r.index, r.score)).collect())
    };
    run() == run()
}

#[quickcheck]
fn chunks_respect_window_and_cover_text(words: Vec<u16>, size: u8, overlap: u8) -> TestResult {
    let size = size as usize % 50 + 1;
    let overlap = overlap as usize % size;
    let text = words.iter().map(|w| format!("w{}", w)).collect::<Vec<_>>().join(" ");

    let chunks = chunk_words(&text, size, overlap);
    if words.is_empty() {
        return TestResult::from_bool(chunks.is_empty());
    }

    let within_window = chunks
        .iter()
        .all(|c| (1..=size).contains(&c.split_whitespace().count()));
    let step = size - overlap;
    let expected_chunks = (words.len() + step - 1) / step;
    let last_word = format!("w{}", words[words.len() - 1]);
    let covers_end = chunks
        .last()
        .map(|c| c.split_whitespace().last() == Some(last_word.as_str()))
        .unwrap_or(false);

    TestResult::from_bool(
        within_window && chunks.len() == expected_chunks && chunks[0].starts_with("w") && covers_end,
    )
}
