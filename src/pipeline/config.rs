//! Pipeline configuration types.
//!
//! A [`PipelineConfig`] holds every tunable of the review pipeline. Each
//! section and field has a default, so `{}` is a complete configuration.
//! These types are the input to the
//! [`ValidationEngine`](super::validation::ValidationEngine).
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "summary": { "top_k_sentences": 3, "damping": 0.85 },
//!   "clustering": { "method": "density", "min_cluster_size": 5 },
//!   "reduction": { "target_dimensions": 5 },
//!   "report": { "keywords_per_cluster": 10 },
//!   "stopwords": { "language": "en", "extra": ["app"] },
//!   "embedding_batch_size": 64,
//!   "strict": false
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::graph::similarity::SimilarityMeasure;
use crate::nlp::stopwords::StopwordFilter;
use crate::nlp::tokenizer::Tokenizer;

/// Fields not recognized by the schema, keyed by name.
pub type UnknownFields = BTreeMap<String, serde_json::Value>;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Extractive summarization settings.
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Clustering policy and its parameters.
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Dimensionality reduction settings.
    #[serde(default)]
    pub reduction: ReductionConfig,

    /// Per-cluster report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Tokenizer stopword and length settings.
    #[serde(default)]
    pub stopwords: StopwordConfig,

    /// Number of texts sent to the embedding adapter per call.
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            summary: SummaryConfig::default(),
            clustering: ClusteringConfig::default(),
            reduction: ReductionConfig::default(),
            report: ReportConfig::default(),
            stopwords: StopwordConfig::default(),
            embedding_batch_size: default_embedding_batch_size(),
            strict: false,
            unknown_fields: UnknownFields::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from JSON. Validation happens separately.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the tokenizer described by the stopword section.
    pub fn tokenizer(&self) -> Tokenizer {
        self.stopwords.tokenizer()
    }
}

// ─── Summary ────────────────────────────────────────────────────────────────

/// TextRank settings shared by the corpus summary and per-cluster samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Probability of following an edge rather than teleporting.
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Number of sentences in the extractive summary.
    #[serde(default = "default_top_k_sentences")]
    pub top_k_sentences: usize,

    /// PageRank iteration cap.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// L1 delta at which PageRank stops.
    #[serde(default = "default_convergence_threshold")]
    pub convergence_threshold: f64,

    /// Sentence similarity measure for edge weights.
    #[serde(default)]
    pub similarity: SimilarityMeasure,

    /// Edge weight to a chosen sentence, as a share of the candidate's
    /// strongest edge, above which the candidate is deferred.
    #[serde(default = "default_redundancy_threshold")]
    pub redundancy_threshold: f64,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            top_k_sentences: default_top_k_sentences(),
            max_iterations: default_max_iterations(),
            convergence_threshold: default_convergence_threshold(),
            similarity: SimilarityMeasure::default(),
            redundancy_threshold: default_redundancy_threshold(),
            unknown_fields: UnknownFields::new(),
        }
    }
}

// ─── Clustering ─────────────────────────────────────────────────────────────

/// Clustering policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringMethod {
    /// Fixed cluster count, seeded k-means++ then Lloyd iterations.
    #[default]
    Kmeans,
    /// Density-based clustering; sparse points are labelled noise.
    Density,
}

impl ClusteringMethod {
    /// Returns the user-facing name used in JSON and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kmeans => "kmeans",
            Self::Density => "density",
        }
    }
}

/// Clustering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub method: ClusteringMethod,

    /// Requested number of clusters (`kmeans`).
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,

    /// Minimum neighbourhood size of a core point (`density`).
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,

    /// Neighbourhood radius (`density`); estimated from the data when absent.
    #[serde(default)]
    pub eps: Option<f64>,

    /// Seed for every randomized step (k-means++ and PCA start vectors).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Lloyd iteration cap (`kmeans`).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Largest centroid shift counted as converged (`kmeans`).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            method: ClusteringMethod::default(),
            cluster_count: default_cluster_count(),
            min_cluster_size: default_min_cluster_size(),
            eps: None,
            seed: default_seed(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            unknown_fields: UnknownFields::new(),
        }
    }
}

// ─── Reduction / report ─────────────────────────────────────────────────────

/// Dimensionality reduction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionConfig {
    /// Output dimension; `null` clusters the raw embeddings.
    #[serde(default = "default_target_dimensions")]
    pub target_dimensions: Option<usize>,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            target_dimensions: default_target_dimensions(),
            unknown_fields: UnknownFields::new(),
        }
    }
}

/// Per-cluster report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_keywords_per_cluster")]
    pub keywords_per_cluster: usize,

    #[serde(default = "default_samples_per_cluster")]
    pub samples_per_cluster: usize,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            keywords_per_cluster: default_keywords_per_cluster(),
            samples_per_cluster: default_samples_per_cluster(),
            unknown_fields: UnknownFields::new(),
        }
    }
}

// ─── Stopwords ──────────────────────────────────────────────────────────────

/// Token filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopwordConfig {
    /// ISO 639-1 code of a built-in stopword list.
    #[serde(default = "default_language")]
    pub language: String,

    /// Explicit stopword list; replaces the language list when set.
    #[serde(default)]
    pub words: Option<Vec<String>>,

    /// Additional stopwords on top of either list.
    #[serde(default)]
    pub extra: Vec<String>,

    /// Tokens shorter than this many characters are dropped.
    #[serde(default = "default_min_token_length")]
    pub min_token_length: usize,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Default for StopwordConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            words: None,
            extra: Vec::new(),
            min_token_length: default_min_token_length(),
            unknown_fields: UnknownFields::new(),
        }
    }
}

impl StopwordConfig {
    /// Build the stopword filter and tokenizer these settings describe.
    pub fn tokenizer(&self) -> Tokenizer {
        let mut filter = match &self.words {
            Some(words) => StopwordFilter::from_list(words.as_slice()),
            None => StopwordFilter::new(&self.language),
        };
        filter.add_stopwords(self.extra.as_slice());
        Tokenizer::new(filter).with_min_token_length(self.min_token_length)
    }
}

// ─── Defaults ───────────────────────────────────────────────────────────────

fn default_damping() -> f64 {
    0.85
}

fn default_top_k_sentences() -> usize {
    3
}

fn default_max_iterations() -> usize {
    100
}

fn default_convergence_threshold() -> f64 {
    1e-6
}

fn default_redundancy_threshold() -> f64 {
    0.5
}

fn default_cluster_count() -> usize {
    5
}

fn default_min_cluster_size() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_target_dimensions() -> Option<usize> {
    Some(5)
}

fn default_keywords_per_cluster() -> usize {
    10
}

fn default_samples_per_cluster() -> usize {
    3
}

fn default_language() -> String {
    "en".to_string()
}

fn default_min_token_length() -> usize {
    2
}

fn default_embedding_batch_size() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config.summary.top_k_sentences, 3);
        assert_eq!(config.summary.damping, 0.85);
        assert_eq!(config.clustering.method, ClusteringMethod::Kmeans);
        assert_eq!(config.clustering.cluster_count, 5);
        assert_eq!(config.reduction.target_dimensions, Some(5));
        assert_eq!(config.report.keywords_per_cluster, 10);
        assert_eq!(config.embedding_batch_size, 64);
        assert!(!config.strict);
        assert!(config.unknown_fields.is_empty());
    }

    #[test]
    fn test_default_matches_empty_json() {
        let parsed = serde_json::to_value(PipelineConfig::from_json("{}").unwrap()).unwrap();
        let built = serde_json::to_value(PipelineConfig::default()).unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_deserialize_full_config() {
        let json = r#"{
            "summary": { "top_k_sentences": 5, "similarity": "cosine" },
            "clustering": { "method": "density", "min_cluster_size": 3, "eps": 0.4 },
            "reduction": { "target_dimensions": null },
            "stopwords": { "words": ["app"], "min_token_length": 3 },
            "embedding_batch_size": 16,
            "strict": true
        }"#;
        let config = PipelineConfig::from_json(json).unwrap();
        assert_eq!(config.summary.top_k_sentences, 5);
        assert_eq!(config.summary.similarity, SimilarityMeasure::Cosine);
        assert_eq!(config.clustering.method, ClusteringMethod::Density);
        assert_eq!(config.clustering.eps, Some(0.4));
        assert_eq!(config.reduction.target_dimensions, None);
        assert_eq!(config.stopwords.min_token_length, 3);
        assert_eq!(config.embedding_batch_size, 16);
        assert!(config.strict);
    }

    #[test]
    fn test_unknown_fields_captured() {
        let json = r#"{ "bogus": 1, "summary": { "top_k": 2 } }"#;
        let config = PipelineConfig::from_json(json).unwrap();
        assert!(config.unknown_fields.contains_key("bogus"));
        assert!(config.summary.unknown_fields.contains_key("top_k"));
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        let err = PipelineConfig::from_json("{ not json").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_explicit_word_list_replaces_language() {
        let config = PipelineConfig::from_json(r#"{ "stopwords": { "words": ["battery"] } }"#)
            .unwrap();
        let tokenizer = config.tokenizer();
        assert_eq!(tokenizer.normalize("The battery drain"), vec!["the", "drain"]);
    }
}
