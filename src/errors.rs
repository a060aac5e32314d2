//! Error types for the review insight pipeline
//!
//! Empty input is never an error here: every stage that can legitimately
//! receive an empty batch returns an empty result instead. Convergence
//! shortfalls are reported on the result and logged, not raised.

use crate::pipeline::validation::ValidationReport;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InsightError>;

/// Errors surfaced to the caller of the pipeline
#[derive(Debug, Error)]
pub enum InsightError {
    /// The configuration failed validation; raised before any data is touched.
    #[error("invalid configuration: {}", summarize_report(.0))]
    Configuration(ValidationReport),

    /// The configuration could not be parsed at all.
    #[error("failed to parse configuration: {0}")]
    ConfigurationParse(#[from] serde_json::Error),

    /// The embedding collaborator failed or returned an unusable batch.
    #[error("embeddings unavailable: {reason}")]
    EmbeddingUnavailable { reason: String },
}

impl InsightError {
    /// Shorthand for an [`InsightError::EmbeddingUnavailable`].
    pub fn embedding_unavailable(reason: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable {
            reason: reason.into(),
        }
    }

    /// Returns `true` for configuration problems (parse or validation).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ConfigurationParse(_))
    }
}

fn summarize_report(report: &ValidationReport) -> String {
    let messages: Vec<String> = report.errors().map(|e| e.to_string()).collect();
    if messages.is_empty() {
        "no errors recorded".to_string()
    } else {
        messages.join("; ")
    }
}
