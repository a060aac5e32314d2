//! Pipeline runner: orchestrates stage execution and artifact flow.
//!
//! A [`ReviewPipeline`] is built once from a validated [`PipelineConfig`] and
//! can then process any number of review batches. Each batch is tokenized
//! once; the sentences feed both the extractive summary and the per-cluster
//! report. An optional [`PipelineObserver`] is notified at every stage
//! boundary.
//!
//! Stages, in order:
//! 1. Tokenize (split sentences, normalize terms)
//! 2. Summarize (sentence graph, PageRank, top-K selection)
//! 3. Embed (adapter calls in fixed-size batches)
//! 4. Reduce (PCA, skipped when `target_dimensions` is null)
//! 5. Cluster
//! 6. Report (keywords, samples, sentiment per cluster)
//!
//! An empty batch short-circuits to empty outputs and never reaches the
//! embedding adapter.

use tracing::{debug, warn};

use crate::cluster::{self, ClusterAssignment, Clusterer};
use crate::embedding::{embed_all, EmbeddingAdapter};
use crate::errors::{InsightError, Result};
use crate::nlp::tokenizer::Tokenizer;
use crate::pipeline::artifacts::{ClusterReport, InsightReport, ReviewAssignment};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::observer::{
    NoopObserver, PipelineObserver, StageClock, StageReportBuilder, STAGE_CLUSTER, STAGE_EMBED,
    STAGE_REDUCE, STAGE_REPORT, STAGE_SUMMARIZE, STAGE_TOKENIZE,
};
use crate::pipeline::validation::{ValidationEngine, ValidationReport};
use crate::reduce::Pca;
use crate::summarizer::cluster::{ClusterSummarizer, ClusterSummary};
use crate::summarizer::ranker::ExtractiveSummarizer;
use crate::summarizer::selector::ExtractiveSummary;
use crate::types::{EmbeddingVector, Review, Sentence};

/// Enter a tracing span for a pipeline stage. The span closes when the
/// enclosing block ends.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

// ============================================================================
// ReviewPipeline
// ============================================================================

/// The review-to-insight pipeline.
///
/// Construction validates the configuration and fails fast; processing never
/// fails for configuration reasons afterwards. The pipeline holds no
/// per-batch state and is `Send + Sync`.
pub struct ReviewPipeline {
    config: PipelineConfig,
    validation: ValidationReport,
    tokenizer: Tokenizer,
    summarizer: ExtractiveSummarizer,
    reducer: Option<Pca>,
    clusterer: Box<dyn Clusterer>,
    reporter: ClusterSummarizer,
}

impl ReviewPipeline {
    /// Validate `config` and build every stage from it.
    ///
    /// Returns [`InsightError::Configuration`] with the full report when any
    /// rule reports an error. Warnings are logged and kept on the pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let validation = ValidationEngine::with_defaults().validate(&config);
        if validation.has_errors() {
            return Err(InsightError::Configuration(validation));
        }
        for warning in validation.warnings() {
            warn!(code = %warning.code, path = %warning.path, "{}", warning.message);
        }

        let reducer = config
            .reduction
            .target_dimensions
            .map(|dims| Pca::new(dims).with_seed(config.clustering.seed));

        Ok(Self {
            tokenizer: config.tokenizer(),
            summarizer: ExtractiveSummarizer::from_config(&config.summary),
            reducer,
            clusterer: cluster::from_config(&config.clustering),
            reporter: ClusterSummarizer::from_config(&config.report, &config.summary),
            validation,
            config,
        })
    }

    /// Parse, validate and build in one step.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(PipelineConfig::from_json(json)?)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Diagnostics from construction; only warnings can be present.
    pub fn validation_report(&self) -> &ValidationReport {
        &self.validation
    }

    /// Extractive summary of the whole batch.
    pub fn summarize(&self, reviews: &[Review]) -> ExtractiveSummary {
        let mut observer = NoopObserver;
        let sentences = self.tokenize(reviews, &mut observer);
        self.summarize_sentences(&sentences, &mut observer)
    }

    /// Embed, reduce and cluster the batch, then summarize each cluster.
    pub fn cluster<A>(&self, reviews: &[Review], adapter: &A) -> Result<ClusterReport>
    where
        A: EmbeddingAdapter + ?Sized,
    {
        let mut observer = NoopObserver;
        let sentences = self.tokenize(reviews, &mut observer);
        self.cluster_sentences(reviews, &sentences, adapter, &mut observer)
    }

    /// Run both branches.
    pub fn run<A>(&self, reviews: &[Review], adapter: &A) -> Result<InsightReport>
    where
        A: EmbeddingAdapter + ?Sized,
    {
        self.run_with_observer(reviews, adapter, &mut NoopObserver)
    }

    /// Run both branches, notifying `observer` at each stage boundary.
    pub fn run_with_observer<A, O>(
        &self,
        reviews: &[Review],
        adapter: &A,
        observer: &mut O,
    ) -> Result<InsightReport>
    where
        A: EmbeddingAdapter + ?Sized,
        O: PipelineObserver,
    {
        let sentences = self.tokenize(reviews, observer);
        let summary = self.summarize_sentences(&sentences, observer);
        let clusters = self.cluster_sentences(reviews, &sentences, adapter, observer)?;
        Ok(InsightReport { summary, clusters })
    }

    // ------------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------------

    fn tokenize<O: PipelineObserver>(&self, reviews: &[Review], observer: &mut O) -> Vec<Vec<Sentence>> {
        trace_stage!(STAGE_TOKENIZE);
        observer.on_stage_start(STAGE_TOKENIZE);
        let clock = StageClock::start();

        let sentences = self.tokenizer.split_corpus(reviews);
        let count: usize = sentences.iter().map(Vec::len).sum();

        let report = StageReportBuilder::new(clock.elapsed()).items(count).build();
        observer.on_stage_end(STAGE_TOKENIZE, &report);
        observer.on_sentences(&sentences);
        debug!(reviews = reviews.len(), sentences = count, "tokenized batch");
        sentences
    }

    fn summarize_sentences<O: PipelineObserver>(
        &self,
        sentences: &[Vec<Sentence>],
        observer: &mut O,
    ) -> ExtractiveSummary {
        trace_stage!(STAGE_SUMMARIZE);
        observer.on_stage_start(STAGE_SUMMARIZE);
        let clock = StageClock::start();

        let flat: Vec<Sentence> = sentences.iter().flatten().cloned().collect();
        let (summary, edges) = if flat.is_empty() {
            (ExtractiveSummary::empty(), 0)
        } else {
            let ranking = self.summarizer.ranker().rank(&flat);
            let summary = self.summarizer.selector().select(&flat, &ranking);
            (summary, ranking.graph.num_edges() / 2)
        };

        let report = StageReportBuilder::new(clock.elapsed())
            .items(summary.sentences.len())
            .nodes(flat.len())
            .edges(edges)
            .iterations(summary.iterations)
            .converged(summary.converged)
            .build();
        observer.on_stage_end(STAGE_SUMMARIZE, &report);
        summary
    }

    fn cluster_sentences<A, O>(
        &self,
        reviews: &[Review],
        sentences: &[Vec<Sentence>],
        adapter: &A,
        observer: &mut O,
    ) -> Result<ClusterReport>
    where
        A: EmbeddingAdapter + ?Sized,
        O: PipelineObserver,
    {
        let method = self.config.clustering.method;
        if reviews.is_empty() {
            return Ok(ClusterReport::empty(method));
        }

        let embeddings = self.embed(reviews, adapter, observer)?;
        let vectors = match &self.reducer {
            Some(pca) => self.reduce(pca, &embeddings, observer),
            None => embeddings,
        };
        observer.on_reduced(&vectors);

        let assignment = self.assign(&vectors, observer);
        let clusters = self.report(reviews, sentences, &assignment, observer);

        let assignments = reviews
            .iter()
            .zip(&assignment.labels)
            .map(|(review, &label)| ReviewAssignment {
                review_id: review.id.clone(),
                label,
            })
            .collect();

        Ok(ClusterReport {
            method,
            dimensions: vectors.first().map_or(0, Vec::len),
            clusters,
            assignments,
        })
    }

    fn embed<A, O>(&self, reviews: &[Review], adapter: &A, observer: &mut O) -> Result<Vec<EmbeddingVector>>
    where
        A: EmbeddingAdapter + ?Sized,
        O: PipelineObserver,
    {
        trace_stage!(STAGE_EMBED);
        observer.on_stage_start(STAGE_EMBED);
        let clock = StageClock::start();

        let texts: Vec<&str> = reviews.iter().map(|r| r.text.as_str()).collect();
        let embeddings = embed_all(adapter, &texts, self.config.embedding_batch_size)?;

        let report = StageReportBuilder::new(clock.elapsed())
            .items(embeddings.len())
            .build();
        observer.on_stage_end(STAGE_EMBED, &report);
        observer.on_embeddings(&embeddings);
        Ok(embeddings)
    }

    fn reduce<O: PipelineObserver>(
        &self,
        pca: &Pca,
        embeddings: &[EmbeddingVector],
        observer: &mut O,
    ) -> Vec<EmbeddingVector> {
        trace_stage!(STAGE_REDUCE);
        observer.on_stage_start(STAGE_REDUCE);
        let clock = StageClock::start();

        let reduced = pca.fit_transform(embeddings);

        let report = StageReportBuilder::new(clock.elapsed())
            .items(reduced.len())
            .build();
        observer.on_stage_end(STAGE_REDUCE, &report);
        reduced
    }

    fn assign<O: PipelineObserver>(
        &self,
        vectors: &[EmbeddingVector],
        observer: &mut O,
    ) -> ClusterAssignment {
        trace_stage!(STAGE_CLUSTER);
        observer.on_stage_start(STAGE_CLUSTER);
        let clock = StageClock::start();

        let assignment = self.clusterer.cluster(vectors);

        let report = StageReportBuilder::new(clock.elapsed())
            .items(assignment.len())
            .clusters(assignment.cluster_count())
            .build();
        observer.on_stage_end(STAGE_CLUSTER, &report);
        observer.on_assignment(&assignment);
        assignment
    }

    fn report<O: PipelineObserver>(
        &self,
        reviews: &[Review],
        sentences: &[Vec<Sentence>],
        assignment: &ClusterAssignment,
        observer: &mut O,
    ) -> Vec<ClusterSummary> {
        trace_stage!(STAGE_REPORT);
        observer.on_stage_start(STAGE_REPORT);
        let clock = StageClock::start();

        let clusters = self.reporter.summarize(reviews, sentences, assignment);

        let report = StageReportBuilder::new(clock.elapsed())
            .items(clusters.len())
            .build();
        observer.on_stage_end(STAGE_REPORT, &report);
        clusters
    }
}

// ============================================================================
// Tests
// ============================================================================
