//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Use cases include timing stages, capturing intermediate
//! artifacts for debugging, and emitting structured telemetry.

use std::time::{Duration, Instant};

use crate::cluster::ClusterAssignment;
use crate::types::{EmbeddingVector, Sentence};

/// Sentence splitting and normalization.
pub const STAGE_TOKENIZE: &str = "tokenize";
/// Graph construction, PageRank and top-K selection over the corpus.
pub const STAGE_SUMMARIZE: &str = "summarize";
/// Calls to the embedding adapter.
pub const STAGE_EMBED: &str = "embed";
/// Dimensionality reduction.
pub const STAGE_REDUCE: &str = "reduce";
/// Clustering of the reduced vectors.
pub const STAGE_CLUSTER: &str = "cluster";
/// Per-cluster keywords, samples and sentiment.
pub const STAGE_REPORT: &str = "report";

// ─── Timing ─────────────────────────────────────────────────────────────────

/// Wall-clock timer started at a stage boundary.
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    started: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Metrics for one completed stage. Only the elapsed time is always present;
/// the rest depend on what the stage does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    elapsed: Duration,
    items: Option<usize>,
    nodes: Option<usize>,
    edges: Option<usize>,
    iterations: Option<usize>,
    converged: Option<bool>,
    clusters: Option<usize>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of records the stage produced (sentences, vectors, summaries).
    pub fn items(&self) -> Option<usize> {
        self.items
    }

    pub fn nodes(&self) -> Option<usize> {
        self.nodes
    }

    pub fn edges(&self) -> Option<usize> {
        self.edges
    }

    pub fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    pub fn converged(&self) -> Option<bool> {
        self.converged
    }

    /// Number of non-noise clusters.
    pub fn clusters(&self) -> Option<usize> {
        self.clusters
    }
}

/// Fluent construction of a [`StageReport`].
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn items(mut self, items: usize) -> Self {
        self.report.items = Some(items);
        self
    }

    pub fn nodes(mut self, nodes: usize) -> Self {
        self.report.nodes = Some(nodes);
        self
    }

    pub fn edges(mut self, edges: usize) -> Self {
        self.report.edges = Some(edges);
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.report.iterations = Some(iterations);
        self
    }

    pub fn converged(mut self, converged: bool) -> Self {
        self.report.converged = Some(converged);
        self
    }

    pub fn clusters(mut self, clusters: usize) -> Self {
        self.report.clusters = Some(clusters);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

// ─── Observer trait ─────────────────────────────────────────────────────────

/// Receives callbacks as the pipeline moves through its stages.
///
/// Every method has an empty default, so implementors override only what
/// they need.
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    /// Sentences of every review, in review order.
    fn on_sentences(&mut self, _sentences: &[Vec<Sentence>]) {}

    /// Embeddings (before reduction), one per review.
    fn on_embeddings(&mut self, _embeddings: &[EmbeddingVector]) {}

    /// Vectors actually clustered (after reduction, if any).
    fn on_reduced(&mut self, _vectors: &[EmbeddingVector]) {}

    fn on_assignment(&mut self, _assignment: &ClusterAssignment) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that records the report of every finished stage in order.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    /// The report of the first run of `stage`, if it ran.
    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.reports
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    /// Sum of all recorded stage durations.
    pub fn total_elapsed(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, report.clone()));
    }
}
