//! # review_insight
//!
//! Turns a batch of free-text product reviews into two outputs:
//!
//! - an extractive summary of the whole batch, the top-K sentences by
//!   TextRank centrality over the sentence similarity graph;
//! - a grouping of reviews into thematic clusters (embeddings, optional PCA,
//!   k-means or DBSCAN), each with distinguishing keywords, representative
//!   sentences and sentiment counts.
//!
//! Embeddings come from a caller-supplied [`EmbeddingAdapter`]; the crate
//! ships a deterministic [`HashingEmbedder`] for offline use.
//!
//! ```no_run
//! use review_insight::{HashingEmbedder, Review, ReviewPipeline};
//!
//! let pipeline = ReviewPipeline::from_json(r#"{ "clustering": { "cluster_count": 3 } }"#)?;
//! let reviews = vec![Review::new("r1", "Battery drain is brutal. Screen is sharp.")];
//! let report = pipeline.run(&reviews, &HashingEmbedder::new(256))?;
//! println!("{}", report.to_json()?);
//! # Ok::<(), review_insight::InsightError>(())
//! ```

pub mod cluster;
pub mod embedding;
pub mod errors;
pub mod graph;
pub mod nlp;
pub mod pagerank;
pub mod pipeline;
pub mod reduce;
pub mod summarizer;
pub mod types;

pub use cluster::{ClusterAssignment, Clusterer};
pub use embedding::{embed_all, EmbeddingAdapter, EmbeddingError, HashingEmbedder};
pub use errors::{InsightError, Result};
pub use pipeline::artifacts::{ClusterReport, InsightReport, ReviewAssignment};
pub use pipeline::config::{ClusteringMethod, PipelineConfig};
pub use pipeline::runner::ReviewPipeline;
pub use summarizer::cluster::ClusterSummary;
pub use summarizer::keywords::Keyword;
pub use summarizer::selector::{ExtractiveSummary, SelectedSentence};
pub use types::{EmbeddingVector, Review, Sentence, NOISE_LABEL, RATING_RANGE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
