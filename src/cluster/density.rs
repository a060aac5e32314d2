//! Density-based clustering (DBSCAN)
//!
//! A point with at least `min_cluster_size` points (itself included) within
//! `eps` is a core point. Clusters grow from core points in input order, and
//! a border point joins the first cluster that reaches it. Everything else is
//! noise. When `eps` is not configured it is estimated from the data as the
//! median distance from each point to its (`min_cluster_size` - 1)-th nearest
//! neighbour.

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::{squared_distance, ClusterAssignment, Clusterer};
use crate::pipeline::config::ClusteringConfig;
use crate::types::{EmbeddingVector, NOISE_LABEL};

const UNVISITED: i32 = i32::MIN;

/// DBSCAN with optional automatic radius
#[derive(Debug, Clone)]
pub struct DensityClusterer {
    /// Minimum neighbourhood size of a core point
    pub min_cluster_size: usize,
    /// Neighbourhood radius; `None` estimates it per batch
    pub eps: Option<f64>,
}

impl Default for DensityClusterer {
    fn default() -> Self {
        Self {
            min_cluster_size: 5,
            eps: None,
        }
    }
}

impl DensityClusterer {
    pub fn new(min_cluster_size: usize) -> Self {
        Self {
            min_cluster_size,
            eps: None,
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            min_cluster_size: config.min_cluster_size,
            eps: config.eps,
        }
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = Some(eps);
        self
    }

    /// Median distance to the (`min_cluster_size` - 1)-th nearest neighbour
    ///
    /// Returns `None` when the batch is too small to have such a neighbour.
    pub fn estimate_eps(&self, points: &[EmbeddingVector]) -> Option<f64> {
        let k = self.min_cluster_size.saturating_sub(1).max(1);
        if points.len() <= k {
            return None;
        }
        let mut kth: Vec<f64> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut dists: Vec<f64> = points
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, q)| squared_distance(p, q))
                    .collect();
                dists.sort_by(f64::total_cmp);
                dists[k - 1].sqrt()
            })
            .collect();
        kth.sort_by(f64::total_cmp);
        let mid = kth.len() / 2;
        let median = if kth.len() % 2 == 0 {
            (kth[mid - 1] + kth[mid]) / 2.0
        } else {
            kth[mid]
        };
        Some(median)
    }

    fn neighbours(points: &[EmbeddingVector], i: usize, eps_sq: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, q)| squared_distance(&points[i], q) <= eps_sq)
            .map(|(j, _)| j)
            .collect()
    }

    fn dbscan(&self, points: &[EmbeddingVector], eps: f64) -> Vec<i32> {
        let eps_sq = eps * eps;
        let mut labels = vec![UNVISITED; points.len()];
        let mut next_label = 0;

        for i in 0..points.len() {
            if labels[i] != UNVISITED {
                continue;
            }
            let seeds = Self::neighbours(points, i, eps_sq);
            if seeds.len() < self.min_cluster_size {
                labels[i] = NOISE_LABEL;
                continue;
            }

            let label = next_label;
            next_label += 1;
            labels[i] = label;
            let mut queue: VecDeque<usize> = seeds.into_iter().filter(|&j| j != i).collect();

            while let Some(j) = queue.pop_front() {
                if labels[j] == NOISE_LABEL {
                    // Border point reached from a core point
                    labels[j] = label;
                }
                if labels[j] != UNVISITED {
                    continue;
                }
                labels[j] = label;
                let reach = Self::neighbours(points, j, eps_sq);
                if reach.len() >= self.min_cluster_size {
                    queue.extend(reach.into_iter().filter(|&m| {
                        labels[m] == UNVISITED || labels[m] == NOISE_LABEL
                    }));
                }
            }
        }
        labels
    }
}

impl Clusterer for DensityClusterer {
    fn cluster(&self, points: &[EmbeddingVector]) -> ClusterAssignment {
        if points.is_empty() {
            return ClusterAssignment::empty();
        }

        let eps = self.eps.or_else(|| self.estimate_eps(points));
        let labels = match eps {
            Some(eps) if points.len() >= self.min_cluster_size => self.dbscan(points, eps),
            _ => vec![NOISE_LABEL; points.len()],
        };

        if labels.iter().all(|&l| l == NOISE_LABEL) {
            warn!(
                points = points.len(),
                min_cluster_size = self.min_cluster_size,
                "no dense region found; grouping all reviews into one cluster"
            );
            return ClusterAssignment::from_raw_labels(points, &vec![0; points.len()]);
        }

        let assignment = ClusterAssignment::from_raw_labels(points, &labels);
        debug!(
            eps = ?eps,
            clusters = assignment.cluster_count(),
            noise = assignment.noise_count(),
            "density clustering finished"
        );
        assignment
    }
}
