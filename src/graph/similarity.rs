//! Sentence similarity measures
//!
//! Both measures work on the sets of distinct normalized terms, are symmetric,
//! and stay within [0, 1]. Sentences without shared terms score exactly 0.

use serde::{Deserialize, Serialize};

/// Which overlap measure weights the sentence graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMeasure {
    /// Shared terms over the sum of log lengths (Mihalcea & Tarau), clamped to 1
    #[default]
    LogOverlap,
    /// Shared terms over the geometric mean of the set sizes
    Cosine,
}

impl SimilarityMeasure {
    /// Returns the user-facing name used in JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogOverlap => "log_overlap",
            Self::Cosine => "cosine",
        }
    }

    /// Score two term sets given their sizes and the size of their intersection
    pub fn score(&self, overlap: usize, len_a: usize, len_b: usize) -> f64 {
        if overlap == 0 || len_a == 0 || len_b == 0 {
            return 0.0;
        }
        let overlap = overlap as f64;
        match self {
            Self::LogOverlap => {
                // ln(1 + n) keeps single-term sentences from dividing by zero
                let denom = (1.0 + len_a as f64).ln() + (1.0 + len_b as f64).ln();
                (overlap / denom).min(1.0)
            }
            Self::Cosine => (overlap / ((len_a * len_b) as f64).sqrt()).min(1.0),
        }
    }

    /// Similarity between two term lists
    pub fn similarity<S: AsRef<str>>(&self, a: &[S], b: &[S]) -> f64 {
        let set_a = distinct_terms(a);
        let set_b = distinct_terms(b);
        let overlap = set_a
            .iter()
            .filter(|t| set_b.binary_search(t).is_ok())
            .count();
        self.score(overlap, set_a.len(), set_b.len())
    }
}

/// Sorted, deduplicated view of a term list
pub fn distinct_terms<S: AsRef<str>>(terms: &[S]) -> Vec<&str> {
    let mut set: Vec<&str> = terms.iter().map(|t| t.as_ref()).collect();
    set.sort_unstable();
    set.dedup();
    set
}
