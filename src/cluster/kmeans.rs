//! K-means with k-means++ seeding
//!
//! Seeding and therefore the whole result is a pure function of the input
//! and the seed. Lloyd iterations stop once no centroid moves further than
//! `tolerance` or after `max_iterations`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use tracing::debug;

use super::{squared_distance, ClusterAssignment, Clusterer};
use crate::pipeline::config::ClusteringConfig;
use crate::types::EmbeddingVector;

/// Fixed-k clustering
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Requested number of clusters
    pub k: usize,
    /// RNG seed for k-means++
    pub seed: u64,
    /// Lloyd iteration cap
    pub max_iterations: usize,
    /// Largest centroid shift (Euclidean) counted as converged
    pub tolerance: f64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            k: 5,
            seed: 42,
            max_iterations: 100,
            tolerance: 1e-4,
        }
    }
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            k: config.cluster_count,
            seed: config.seed,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Cluster count actually used: never more than the distinct points
    pub fn effective_k(&self, points: &[EmbeddingVector]) -> usize {
        let distinct: FxHashSet<Vec<u32>> = points
            .iter()
            .map(|p| p.iter().map(|x| x.to_bits()).collect())
            .collect();
        self.k.min(distinct.len())
    }

    fn seed_centroids(&self, points: &[EmbeddingVector], k: usize) -> Vec<EmbeddingVector> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = Vec::with_capacity(k);
        centroids.push(points[rng.gen_range(0..points.len())].clone());

        let mut nearest: Vec<f64> = points
            .iter()
            .map(|p| squared_distance(p, &centroids[0]))
            .collect();

        while centroids.len() < k {
            let total: f64 = nearest.iter().sum();
            if total <= 0.0 {
                break;
            }
            let mut target = rng.gen::<f64>() * total;
            // Fall back to the farthest point if rounding walks past the end
            let mut chosen = nearest
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
                .map_or(0, |(i, _)| i);
            for (i, &d) in nearest.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }

            let centroid = points[chosen].clone();
            for (dist, p) in nearest.iter_mut().zip(points) {
                *dist = dist.min(squared_distance(p, &centroid));
            }
            centroids.push(centroid);
        }
        centroids
    }
}

impl Clusterer for KMeans {
    fn cluster(&self, points: &[EmbeddingVector]) -> ClusterAssignment {
        if points.is_empty() {
            return ClusterAssignment::empty();
        }
        let k = self.effective_k(points).max(1);
        let dims = points[0].len();
        let mut centroids = self.seed_centroids(points, k);
        let mut labels = vec![0i32; points.len()];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;

            for (label, point) in labels.iter_mut().zip(points) {
                *label = nearest_centroid(point, &centroids) as i32;
            }

            let mut sums = vec![vec![0.0f64; dims]; centroids.len()];
            let mut counts = vec![0usize; centroids.len()];
            for (point, &label) in points.iter().zip(&labels) {
                counts[label as usize] += 1;
                for (sum, &x) in sums[label as usize].iter_mut().zip(point) {
                    *sum += x as f64;
                }
            }

            let mut max_shift = 0.0f64;
            for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(&counts) {
                // An emptied cluster keeps its previous centroid
                if count == 0 {
                    continue;
                }
                let updated: EmbeddingVector =
                    sum.iter().map(|s| (s / count as f64) as f32).collect();
                max_shift = max_shift.max(squared_distance(centroid, &updated).sqrt());
                *centroid = updated;
            }

            if max_shift <= self.tolerance {
                converged = true;
                break;
            }
        }

        // Labels must match the final centroids
        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest_centroid(point, &centroids) as i32;
        }

        debug!(k, iterations, converged, "k-means finished");
        ClusterAssignment::from_raw_labels(points, &labels)
    }
}

/// Index of the closest centroid; ties go to the lower index
fn nearest_centroid(point: &[f32], centroids: &[EmbeddingVector]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}
