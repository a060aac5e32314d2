//! TextRank sentence ranking
//!
//! Builds the sentence similarity graph, runs weighted PageRank over it and
//! hands the scores to the [`SentenceSelector`].

use super::selector::{ExtractiveSummary, SelectorConfig, SentenceSelector};
use crate::graph::builder::build_graph_parallel;
use crate::graph::csr::CsrGraph;
use crate::graph::similarity::SimilarityMeasure;
use crate::pagerank::standard::StandardPageRank;
use crate::pagerank::PageRankResult;
use crate::pipeline::config::SummaryConfig;
use crate::types::Sentence;
use tracing::debug;

/// Graph and scores for one ranking call
#[derive(Debug, Clone)]
pub struct SentenceRanking {
    /// Similarity graph, one node per input sentence in input order
    pub graph: CsrGraph,
    /// PageRank scores indexed like the input sentences
    pub result: PageRankResult,
}

/// Ranks sentences by random-walk centrality over their similarity graph
#[derive(Debug, Clone, Default)]
pub struct SentenceRanker {
    pagerank: StandardPageRank,
    measure: SimilarityMeasure,
}

impl SentenceRanker {
    /// Create a ranker with default PageRank settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ranker from the summary configuration
    pub fn from_config(config: &SummaryConfig) -> Self {
        Self {
            pagerank: StandardPageRank::new()
                .with_damping(config.damping)
                .with_max_iterations(config.max_iterations)
                .with_threshold(config.convergence_threshold),
            measure: config.similarity,
        }
    }

    /// Set the similarity measure used for edge weights
    pub fn with_measure(mut self, measure: SimilarityMeasure) -> Self {
        self.measure = measure;
        self
    }

    /// Replace the PageRank settings
    pub fn with_pagerank(mut self, pagerank: StandardPageRank) -> Self {
        self.pagerank = pagerank;
        self
    }

    /// Score every sentence
    ///
    /// Never fails: an exhausted iteration budget yields the current estimate
    /// with `converged == false`.
    pub fn rank(&self, sentences: &[Sentence]) -> SentenceRanking {
        let builder = build_graph_parallel(sentences, self.measure);
        let graph = CsrGraph::from_builder(&builder);
        let result = self.pagerank.run(&graph);

        debug!(
            nodes = graph.num_nodes,
            edges = graph.num_edges() / 2,
            iterations = result.iterations,
            "ranked sentences"
        );
        SentenceRanking { graph, result }
    }
}

/// Ranking plus selection: sentences in, extractive summary out
#[derive(Debug, Clone, Default)]
pub struct ExtractiveSummarizer {
    ranker: SentenceRanker,
    selector: SentenceSelector,
}

impl ExtractiveSummarizer {
    /// Create a summarizer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a summarizer from the summary configuration
    pub fn from_config(config: &SummaryConfig) -> Self {
        Self {
            ranker: SentenceRanker::from_config(config),
            selector: SentenceSelector::with_config(SelectorConfig {
                num_sentences: config.top_k_sentences,
                redundancy_threshold: config.redundancy_threshold,
            }),
        }
    }

    /// Override the number of sentences to select
    pub fn with_num_sentences(mut self, n: usize) -> Self {
        self.selector = self.selector.with_num_sentences(n);
        self
    }

    pub fn ranker(&self) -> &SentenceRanker {
        &self.ranker
    }

    pub fn selector(&self) -> &SentenceSelector {
        &self.selector
    }

    /// Summarize sentences given in corpus order
    pub fn summarize(&self, sentences: &[Sentence]) -> ExtractiveSummary {
        if sentences.is_empty() {
            return ExtractiveSummary::empty();
        }
        let ranking = self.ranker.rank(sentences);
        self.selector.select(sentences, &ranking)
    }
}
