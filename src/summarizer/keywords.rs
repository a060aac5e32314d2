//! Distinguishing keyword extraction across clusters
//!
//! Each group's relative term frequency is compared with the term's mean
//! relative frequency over all groups. The score `tf * ln(tf / mean)` is
//! positive only for terms over-represented in the group, so a term that is
//! equally frequent everywhere scores zero and is dropped. With a single
//! group there is nothing to contrast against and plain frequency is used.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Ratios this close to 1 count as "equally frequent"
const RATIO_EPSILON: f64 = 1e-9;

/// A keyword and its distinguishing score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    /// Normalized term
    pub term: String,
    /// Distinguishing score (higher is more characteristic)
    pub score: f64,
}

/// Ranks terms that set one group of documents apart from the others
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    max_keywords: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}

impl KeywordExtractor {
    /// Create an extractor returning at most `max_keywords` per group
    pub fn new(max_keywords: usize) -> Self {
        Self { max_keywords }
    }

    /// Extract keywords for every group
    ///
    /// `groups[g]` holds every normalized term occurrence in group `g`. The
    /// output is parallel to `groups`.
    pub fn extract<S: AsRef<str>>(&self, groups: &[Vec<S>]) -> Vec<Vec<Keyword>> {
        let frequencies: Vec<FxHashMap<&str, f64>> =
            groups.iter().map(|g| relative_frequencies(g)).collect();

        if frequencies.len() <= 1 {
            return frequencies
                .iter()
                .map(|tf| self.top(tf.iter().map(|(&t, &f)| (t, f))))
                .collect();
        }

        let mut totals: FxHashMap<&str, f64> = FxHashMap::default();
        for tf in &frequencies {
            for (&term, &f) in tf {
                *totals.entry(term).or_insert(0.0) += f;
            }
        }
        let num_groups = frequencies.len() as f64;

        frequencies
            .iter()
            .map(|tf| {
                let scored = tf.iter().filter_map(|(&term, &f)| {
                    let mean = totals[term] / num_groups;
                    let log_ratio = (f / mean).ln();
                    (log_ratio > RATIO_EPSILON).then_some((term, f * log_ratio))
                });
                self.top(scored)
            })
            .collect()
    }

    fn top<'a>(&self, scored: impl Iterator<Item = (&'a str, f64)>) -> Vec<Keyword> {
        let mut keywords: Vec<Keyword> = scored
            .map(|(term, score)| Keyword {
                term: term.to_string(),
                score,
            })
            .collect();
        keywords.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
        keywords.truncate(self.max_keywords);
        keywords
    }
}

fn relative_frequencies<S: AsRef<str>>(terms: &[S]) -> FxHashMap<&str, f64> {
    let mut counts: FxHashMap<&str, f64> = FxHashMap::default();
    for term in terms {
        *counts.entry(term.as_ref()).or_insert(0.0) += 1.0;
    }
    let total = terms.len() as f64;
    for value in counts.values_mut() {
        *value /= total;
    }
    counts
}
