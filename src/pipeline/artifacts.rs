//! Pipeline output records.
//!
//! These are the public contract of the pipeline: everything else may change,
//! these serialize to the JSON handed to report formatters and other
//! downstream consumers.

use serde::Serialize;

use super::config::ClusteringMethod;
use crate::summarizer::cluster::ClusterSummary;
use crate::summarizer::selector::ExtractiveSummary;

/// Which cluster a review landed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewAssignment {
    pub review_id: String,
    /// Cluster label, or -1 for noise.
    pub label: i32,
}

/// Result of the embedding and clustering branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    /// Clustering policy that produced the labels.
    pub method: ClusteringMethod,
    /// Length of the vectors that were clustered (after reduction, if any).
    pub dimensions: usize,
    /// One summary per cluster, largest first; noise after equal-sized clusters.
    pub clusters: Vec<ClusterSummary>,
    /// One entry per input review, in input order.
    pub assignments: Vec<ReviewAssignment>,
}

impl ClusterReport {
    /// Report for an empty batch.
    pub fn empty(method: ClusteringMethod) -> Self {
        Self {
            method,
            dimensions: 0,
            clusters: Vec::new(),
            assignments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Sum of member counts over every cluster, noise included.
    pub fn total_members(&self) -> usize {
        self.clusters.iter().map(|c| c.member_count).sum()
    }

    /// Label assigned to `review_id`, if the review was part of the batch.
    pub fn label_of(&self, review_id: &str) -> Option<i32> {
        self.assignments
            .iter()
            .find(|a| a.review_id == review_id)
            .map(|a| a.label)
    }

    /// Summary for `label`, if such a cluster exists.
    pub fn cluster(&self, label: i32) -> Option<&ClusterSummary> {
        self.clusters.iter().find(|c| c.label == label)
    }
}

/// Both branches of the pipeline for one batch of reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    pub summary: ExtractiveSummary,
    pub clusters: ClusterReport,
}

impl InsightReport {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let report = ClusterReport::empty(ClusteringMethod::Density);
        assert!(report.is_empty());
        assert_eq!(report.total_members(), 0);
        assert_eq!(report.label_of("r1"), None);
        assert!(report.cluster(0).is_none());
    }

    #[test]
    fn test_insight_report_json_shape() {
        let report = InsightReport {
            summary: ExtractiveSummary::empty(),
            clusters: ClusterReport {
                method: ClusteringMethod::Kmeans,
                dimensions: 2,
                clusters: Vec::new(),
                assignments: vec![ReviewAssignment {
                    review_id: "r1".to_string(),
                    label: 0,
                }],
            },
        };
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["clusters"]["method"], "kmeans");
        assert_eq!(json["clusters"]["assignments"][0]["review_id"], "r1");
        assert_eq!(json["summary"]["converged"], true);
    }
}
