//! Per-cluster summaries
//!
//! For each cluster (and the noise group, if any) this gathers the member
//! reviews, contrasts their vocabulary against the other groups, picks
//! representative sentences with TextRank restricted to the cluster, and
//! tallies the externally supplied sentiment labels.

use std::collections::BTreeMap;

use serde::Serialize;

use super::keywords::{Keyword, KeywordExtractor};
use super::ranker::ExtractiveSummarizer;
use super::selector::SelectedSentence;
use crate::cluster::ClusterAssignment;
use crate::pipeline::config::{ReportConfig, SummaryConfig};
use crate::types::{Review, Sentence, NOISE_LABEL};

/// Summary of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Cluster label, or -1 for noise
    pub label: i32,
    /// Number of member reviews
    pub member_count: usize,
    /// Member review ids in input order
    pub review_ids: Vec<String>,
    /// Distinguishing keywords, best first
    pub keywords: Vec<Keyword>,
    /// Representative sentences in corpus order
    pub samples: Vec<SelectedSentence>,
    /// Count per sentiment label; `None` when no member has one
    pub sentiment: Option<BTreeMap<String, usize>>,
    /// Mean star rating of the members with a rating in 1-5
    pub mean_rating: Option<f64>,
}

impl ClusterSummary {
    pub fn is_noise(&self) -> bool {
        self.label == NOISE_LABEL
    }
}

/// Builds [`ClusterSummary`] records from a clustering of reviews
#[derive(Debug, Clone)]
pub struct ClusterSummarizer {
    keywords: KeywordExtractor,
    sampler: ExtractiveSummarizer,
}

impl Default for ClusterSummarizer {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default(), &SummaryConfig::default())
    }
}

impl ClusterSummarizer {
    pub fn new(keywords: KeywordExtractor, sampler: ExtractiveSummarizer) -> Self {
        Self { keywords, sampler }
    }

    /// Keyword and sample counts from `report`; TextRank settings from `summary`
    pub fn from_config(report: &ReportConfig, summary: &SummaryConfig) -> Self {
        Self {
            keywords: KeywordExtractor::new(report.keywords_per_cluster),
            sampler: ExtractiveSummarizer::from_config(summary)
                .with_num_sentences(report.samples_per_cluster),
        }
    }

    /// Summarize every group of `assignment`
    ///
    /// `sentences[i]` must hold the sentences of `reviews[i]`, and the
    /// assignment must label the same reviews. Output is ordered by member
    /// count (descending), then label, with noise after clusters of equal size.
    pub fn summarize(
        &self,
        reviews: &[Review],
        sentences: &[Vec<Sentence>],
        assignment: &ClusterAssignment,
    ) -> Vec<ClusterSummary> {
        let groups = assignment.groups();

        let terms: Vec<Vec<&str>> = groups
            .iter()
            .map(|(_, members)| {
                members
                    .iter()
                    .flat_map(|&i| sentences[i].iter())
                    .flat_map(|s| s.terms.iter().map(String::as_str))
                    .collect()
            })
            .collect();
        let keywords = self.keywords.extract(&terms);

        let mut summaries: Vec<ClusterSummary> = groups
            .iter()
            .zip(keywords)
            .map(|((label, members), keywords)| {
                let member_sentences: Vec<Sentence> = members
                    .iter()
                    .flat_map(|&i| sentences[i].iter().cloned())
                    .collect();
                let samples = self.sampler.summarize(&member_sentences).sentences;

                ClusterSummary {
                    label: *label,
                    member_count: members.len(),
                    review_ids: members.iter().map(|&i| reviews[i].id.clone()).collect(),
                    keywords,
                    samples,
                    sentiment: sentiment_counts(members.iter().map(|&i| &reviews[i])),
                    mean_rating: mean_rating(members.iter().map(|&i| &reviews[i])),
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.member_count
                .cmp(&a.member_count)
                .then(a.is_noise().cmp(&b.is_noise()))
                .then(a.label.cmp(&b.label))
        });
        summaries
    }
}

fn sentiment_counts<'a>(
    members: impl Iterator<Item = &'a Review>,
) -> Option<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();
    for review in members {
        if let Some(label) = &review.sentiment {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
    }
    (!counts.is_empty()).then_some(counts)
}

fn mean_rating<'a>(members: impl Iterator<Item = &'a Review>) -> Option<f64> {
    let ratings: Vec<f64> = members.filter_map(Review::star_rating).map(f64::from).collect();
    (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64)
}
