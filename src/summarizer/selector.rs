//! Top-K sentence selection for extractive summaries
//!
//! Candidates are visited by descending TextRank score (ties go to the
//! earlier sentence). A candidate is redundant when its edge to an already
//! chosen sentence, relative to the candidate's own strongest edge, exceeds
//! the redundancy threshold. Redundant candidates are deferred and only fill
//! slots left over once the ranked list is exhausted. The chosen sentences
//! are returned in corpus order.

use super::ranker::SentenceRanking;
use crate::types::Sentence;
use serde::Serialize;

/// Configuration for sentence selection
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Number of sentences to select
    pub num_sentences: usize,
    /// Share of a candidate's strongest edge weight above which an edge to a
    /// chosen sentence makes it redundant (1.0 disables)
    pub redundancy_threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            num_sentences: 3,
            redundancy_threshold: 0.5,
        }
    }
}

/// An extractive summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractiveSummary {
    /// Selected sentences in corpus order
    pub sentences: Vec<SelectedSentence>,
    /// PageRank iterations performed
    pub iterations: usize,
    /// Whether PageRank converged within its budget
    pub converged: bool,
}

impl ExtractiveSummary {
    /// Summary of an empty corpus
    pub fn empty() -> Self {
        Self {
            sentences: Vec::new(),
            iterations: 0,
            converged: true,
        }
    }

    /// Check if no sentences were selected
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Selected sentence texts joined with single spaces
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A selected sentence with its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedSentence {
    /// Original sentence text
    pub text: String,
    /// Review the sentence came from
    pub review_id: String,
    /// Position within that review
    pub position: usize,
    /// Position within the corpus
    pub index: usize,
    /// TextRank score
    pub score: f64,
}

/// Redundancy-aware top-K selector
#[derive(Debug, Clone, Default)]
pub struct SentenceSelector {
    config: SelectorConfig,
}

impl SentenceSelector {
    /// Create a new selector with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Set number of sentences to select
    pub fn with_num_sentences(mut self, n: usize) -> Self {
        self.config.num_sentences = n;
        self
    }

    /// Set the redundancy threshold
    pub fn with_redundancy_threshold(mut self, threshold: f64) -> Self {
        self.config.redundancy_threshold = threshold;
        self
    }

    /// Choose sentences from a ranking over `sentences`
    ///
    /// `ranking` must have been computed over the same slice.
    pub fn select(&self, sentences: &[Sentence], ranking: &SentenceRanking) -> ExtractiveSummary {
        let k = self.config.num_sentences;
        let graph = &ranking.graph;
        let mut chosen: Vec<u32> = Vec::with_capacity(k);
        let mut deferred: Vec<u32> = Vec::new();

        for id in ranking.result.ranked() {
            if chosen.len() >= k {
                break;
            }
            let strongest = graph
                .neighbors(id)
                .map(|(_, w)| w)
                .fold(0.0f64, f64::max);
            let redundant = strongest > 0.0
                && chosen.iter().any(|&c| {
                    graph.weight(id, c) / strongest > self.config.redundancy_threshold
                });
            if redundant {
                deferred.push(id);
            } else {
                chosen.push(id);
            }
        }
        for id in deferred {
            if chosen.len() >= k {
                break;
            }
            chosen.push(id);
        }

        let mut selected: Vec<SelectedSentence> = chosen
            .into_iter()
            .map(|id| {
                let sentence = &sentences[id as usize];
                SelectedSentence {
                    text: sentence.text.clone(),
                    review_id: sentence.review_id.clone(),
                    position: sentence.position,
                    index: sentence.index,
                    score: ranking.result.score(id),
                }
            })
            .collect();

        // Sort by corpus order
        selected.sort_by_key(|s| s.index);

        ExtractiveSummary {
            sentences: selected,
            iterations: ranking.result.iterations,
            converged: ranking.result.converged,
        }
    }
}
