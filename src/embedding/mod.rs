//! Embedding adapter boundary
//!
//! The pipeline never computes embeddings itself. It hands review texts to an
//! [`EmbeddingAdapter`] in fixed-size batches and checks every batch before
//! the vectors go anywhere near the reducer: one vector per text, one shared
//! non-zero dimension, finite values only. Any violation surfaces as
//! [`InsightError::EmbeddingUnavailable`]; no placeholder vectors are made up.

pub mod hashing;
pub mod response;

pub use hashing::HashingEmbedder;
pub use response::{EmbeddingData, EmbeddingRequest, EmbeddingResponse};

use thiserror::Error;
use tracing::debug;

use crate::errors::{InsightError, Result};
use crate::types::EmbeddingVector;

/// Failure reported by an embedding collaborator
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The backing service or model failed.
    #[error("{0}")]
    Backend(String),

    /// A response carried a different number of vectors than requested.
    #[error("expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// A response entry referred to a position outside the batch.
    #[error("embedding index {index} out of range for a batch of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Two response entries claimed the same batch position.
    #[error("duplicate embedding index {0}")]
    DuplicateIndex(usize),

    /// A response body did not match the expected schema.
    #[error("malformed embedding response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl EmbeddingError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Turns texts into vectors, one per text, in input order
pub trait EmbeddingAdapter {
    fn embed(&self, texts: &[&str]) -> std::result::Result<Vec<EmbeddingVector>, EmbeddingError>;
}

impl<F> EmbeddingAdapter for F
where
    F: Fn(&[&str]) -> std::result::Result<Vec<EmbeddingVector>, EmbeddingError>,
{
    fn embed(&self, texts: &[&str]) -> std::result::Result<Vec<EmbeddingVector>, EmbeddingError> {
        self(texts)
    }
}

/// Embed every text, `batch_size` texts per adapter call
///
/// Returns one vector per text in input order. An empty `texts` never calls
/// the adapter.
pub fn embed_all<A: EmbeddingAdapter + ?Sized>(
    adapter: &A,
    texts: &[&str],
    batch_size: usize,
) -> Result<Vec<EmbeddingVector>> {
    let batch_size = batch_size.max(1);
    let mut vectors: Vec<EmbeddingVector> = Vec::with_capacity(texts.len());
    let mut dims: Option<usize> = None;

    for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
        let embedded = adapter.embed(batch).map_err(|e| {
            InsightError::embedding_unavailable(format!("batch {batch_index}: {e}"))
        })?;
        if embedded.len() != batch.len() {
            return Err(InsightError::embedding_unavailable(format!(
                "batch {batch_index}: adapter returned {} vectors for {} texts",
                embedded.len(),
                batch.len()
            )));
        }

        for (offset, vector) in embedded.iter().enumerate() {
            let position = batch_index * batch_size + offset;
            let expected = *dims.get_or_insert(vector.len());
            if vector.is_empty() {
                return Err(InsightError::embedding_unavailable(format!(
                    "text {position}: empty embedding"
                )));
            }
            if vector.len() != expected {
                return Err(InsightError::embedding_unavailable(format!(
                    "text {position}: dimension {} differs from {expected}",
                    vector.len()
                )));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(InsightError::embedding_unavailable(format!(
                    "text {position}: embedding contains non-finite values"
                )));
            }
        }

        debug!(batch = batch_index, size = batch.len(), "embedded batch");
        vectors.extend(embedded);
    }

    Ok(vectors)
}
