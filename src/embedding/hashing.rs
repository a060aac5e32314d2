//! Offline feature-hashing embedder

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use super::{EmbeddingAdapter, EmbeddingError};
use crate::nlp::tokenizer::Tokenizer;
use crate::types::EmbeddingVector;

/// Deterministic bag-of-words embedder
///
/// Each normalized token is hashed to one of `dimensions` buckets with a
/// hash-derived sign, and the resulting vector is scaled to unit length.
/// Texts sharing vocabulary land close together, which is enough for tests
/// and for machines without access to an embedding model.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    tokenizer: Tokenizer,
}

impl HashingEmbedder {
    /// Create an embedder producing vectors of length `dimensions` (at least 1)
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            tokenizer: Tokenizer::default(),
        }
    }

    /// Use a specific tokenizer for normalization
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed one text
    pub fn embed_text(&self, text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in self.tokenizer.normalize(text) {
            let mut hasher = FxHasher::default();
            token.hash(&mut hasher);
            let hash = hasher.finish();
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl EmbeddingAdapter for HashingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
