//! Sentence embedding table and similarity helpers.
//!
//! Embeddings are computed upstream and handed to the core as a read-only table keyed by the
//! exact sentence text. The [`Embedder`] trait exists so the command-line front end can fill
//! cache misses before a run; the summarizer itself never embeds anything.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from sentence text to a fixed-dimensional vector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingTable {
    vectors: BTreeMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the vector for a sentence.
    pub fn insert(&mut self, sentence: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(sentence.into(), vector);
    }

    /// Look up the vector for a sentence.
    pub fn get(&self, sentence: &str) -> Option<&[f32]> {
        self.vectors.get(sentence).map(Vec::as_slice)
    }

    /// Whether the sentence has a vector.
    pub fn contains(&self, sentence: &str) -> bool {
        self.vectors.contains_key(sentence)
    }

    /// Number of cached vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Embed every sentence that has no cached vector yet; returns how many were added.
    pub fn fill_missing<'a, I>(&mut self, sentences: I, embedder: &dyn Embedder) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for sentence in sentences {
            if self.contains(sentence) {
                continue;
            }
            self.vectors
                .insert(sentence.to_string(), embedder.embed(sentence));
            added += 1;
        }
        if added > 0 {
            tracing::debug!(added, total = self.len(), "Filled embedding cache misses");
        }
        added
    }
}

/// Interface implemented by sentence encoders.
pub trait Embedder: Send + Sync {
    /// Produce a vector for one sentence.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic byte-hashing encoder used when no neural embeddings are cached.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Construct an encoder producing `dimension`-sized unit vectors.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let dimension = self.dimension.max(1);
        let mut embedding = vec![0.0_f32; dimension];

        let normalized = text.to_lowercase();
        for (idx, byte) in normalized.bytes().enumerate() {
            embedding[idx % dimension] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        embedding
    }
}

/// Cosine similarity of two vectors; `0.0` when either has zero norm.
///
/// Vectors of different dimension are compared over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
