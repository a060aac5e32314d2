//! Clustering of review vectors
//!
//! Two policies are available: [`kmeans::KMeans`] for a fixed cluster count
//! and [`density::DensityClusterer`] for density-based grouping with noise.
//! Both hand raw labels to [`ClusterAssignment::from_raw_labels`], which
//! renumbers clusters by descending size and computes centroids, so label
//! semantics are identical whichever policy ran.

pub mod density;
pub mod kmeans;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::pipeline::config::{ClusteringConfig, ClusteringMethod};
use crate::types::{EmbeddingVector, NOISE_LABEL};

/// Groups vectors; labels are aligned with the input order
pub trait Clusterer: Send + Sync {
    fn cluster(&self, points: &[EmbeddingVector]) -> ClusterAssignment;
}

/// Build the clusterer selected by the configuration
pub fn from_config(config: &ClusteringConfig) -> Box<dyn Clusterer> {
    match config.method {
        ClusteringMethod::Kmeans => Box::new(kmeans::KMeans::from_config(config)),
        ClusteringMethod::Density => Box::new(density::DensityClusterer::from_config(config)),
    }
}

/// Cluster labels for a batch of vectors
///
/// Labels run contiguously from 0 with cluster 0 the largest; ties in size go
/// to the cluster whose first member comes first. [`NOISE_LABEL`] marks
/// points outside every cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterAssignment {
    /// One label per input vector
    pub labels: Vec<i32>,
    /// Mean vector of each non-noise cluster, indexed by label
    pub centroids: Vec<EmbeddingVector>,
}

impl ClusterAssignment {
    /// Assignment for an empty batch
    pub fn empty() -> Self {
        Self::default()
    }

    /// Renumber arbitrary non-negative labels by size and compute centroids
    ///
    /// Any negative label is treated as noise.
    pub fn from_raw_labels(points: &[EmbeddingVector], raw: &[i32]) -> Self {
        let mut first_seen: FxHashMap<i32, (usize, usize)> = FxHashMap::default();
        for (i, &label) in raw.iter().enumerate() {
            if label < 0 {
                continue;
            }
            first_seen.entry(label).or_insert((0, i)).0 += 1;
        }

        let mut order: Vec<(i32, usize, usize)> = first_seen
            .into_iter()
            .map(|(label, (size, first))| (label, size, first))
            .collect();
        order.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let mapping: FxHashMap<i32, i32> = order
            .iter()
            .enumerate()
            .map(|(new, &(old, _, _))| (old, new as i32))
            .collect();
        let labels: Vec<i32> = raw
            .iter()
            .map(|label| mapping.get(label).copied().unwrap_or(NOISE_LABEL))
            .collect();

        let centroids = centroids(points, &labels, order.len());
        Self { labels, centroids }
    }

    /// Number of labelled inputs
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of non-noise clusters
    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }

    /// Number of inputs labelled noise
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE_LABEL).count()
    }

    /// Input indices carrying `label`, in input order
    pub fn members(&self, label: i32) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Member count per label (noise included when present)
    pub fn counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for &label in &self.labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// Every label with its members; clusters by label, then noise
    pub fn groups(&self) -> Vec<(i32, Vec<usize>)> {
        let mut groups: Vec<(i32, Vec<usize>)> = (0..self.cluster_count() as i32)
            .map(|label| (label, Vec::new()))
            .collect();
        let mut noise = Vec::new();
        for (i, &label) in self.labels.iter().enumerate() {
            if label == NOISE_LABEL {
                noise.push(i);
            } else if let Some((_, members)) = groups.get_mut(label as usize) {
                members.push(i);
            }
        }
        if !noise.is_empty() {
            groups.push((NOISE_LABEL, noise));
        }
        groups
    }
}

fn centroids(points: &[EmbeddingVector], labels: &[i32], k: usize) -> Vec<EmbeddingVector> {
    let dims = points.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0f64; dims]; k];
    let mut counts = vec![0usize; k];
    for (point, &label) in points.iter().zip(labels) {
        if label < 0 {
            continue;
        }
        let label = label as usize;
        counts[label] += 1;
        for (sum, &x) in sums[label].iter_mut().zip(point) {
            *sum += x as f64;
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            sum.into_iter()
                .map(|s| (s / count.max(1) as f64) as f32)
                .collect()
        })
        .collect()
}

/// Squared Euclidean distance, accumulated in f64
pub(crate) fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum()
}
