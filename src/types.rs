//! Core data types for review analysis
//!
//! Reviews come in from an ingestion collaborator; sentences are derived from
//! them by the tokenizer and carry the normalized terms used for similarity.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Star ratings outside this range are kept on the review but never aggregated
pub const RATING_RANGE: RangeInclusive<u8> = 1..=5;

/// A single customer review. Read-only once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Caller-assigned identifier, used to trace results back to inputs
    pub id: String,
    /// Raw review text
    pub text: String,
    /// Optional star rating; see [`RATING_RANGE`]
    #[serde(default)]
    pub rating: Option<u8>,
    /// Optional creation time in unix seconds
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Optional sentiment label attached by an external classifier
    #[serde(default)]
    pub sentiment: Option<String>,
}

impl Review {
    /// Create a review with only an id and text
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            rating: None,
            timestamp: None,
            sentiment: None,
        }
    }

    /// Rating if it lies within [`RATING_RANGE`]
    pub fn star_rating(&self) -> Option<u8> {
        self.rating.filter(|r| RATING_RANGE.contains(r))
    }

    /// Attach a star rating
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Attach a creation timestamp (unix seconds)
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attach an externally computed sentiment label
    pub fn with_sentiment(mut self, sentiment: impl Into<String>) -> Self {
        self.sentiment = Some(sentiment.into());
        self
    }
}

/// A sentence within a review
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// Original sentence text, casing and punctuation preserved
    pub text: String,
    /// Id of the review this sentence came from
    pub review_id: String,
    /// Position of the sentence within its review
    pub position: usize,
    /// Position of the sentence within the whole corpus
    pub index: usize,
    /// Normalized terms, used only for similarity
    pub terms: Vec<String>,
}

impl Sentence {
    /// Create a new sentence
    pub fn new(
        text: impl Into<String>,
        review_id: impl Into<String>,
        position: usize,
        index: usize,
        terms: Vec<String>,
    ) -> Self {
        Self {
            text: text.into(),
            review_id: review_id.into(),
            position,
            index,
            terms,
        }
    }

    /// Check whether the sentence has any normalized terms
    pub fn has_terms(&self) -> bool {
        !self.terms.is_empty()
    }
}

/// An embedding vector produced by an external model
pub type EmbeddingVector = Vec<f32>;

/// Cluster label reserved for points that belong to no dense cluster
pub const NOISE_LABEL: i32 = -1;
