//! PageRank algorithms
//!
//! This module provides the weighted PageRank used to score sentences.

pub mod standard;

/// Result of a PageRank computation
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// Scores for each node (indexed by node ID)
    pub scores: Vec<f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final convergence delta
    pub delta: f64,
    /// Whether the algorithm converged
    pub converged: bool,
}

impl PageRankResult {
    /// Create a new PageRank result
    pub fn new(scores: Vec<f64>, iterations: usize, delta: f64, converged: bool) -> Self {
        Self {
            scores,
            iterations,
            delta,
            converged,
        }
    }

    /// All node IDs ordered by descending score; ties go to the lower node ID
    pub fn ranked(&self) -> Vec<u32> {
        let mut order: Vec<u32> = (0..self.scores.len() as u32).collect();
        order.sort_by(|&a, &b| {
            self.scores[b as usize]
                .total_cmp(&self.scores[a as usize])
                .then(a.cmp(&b))
        });
        order
    }

    /// Get top N nodes by score
    pub fn top_n(&self, n: usize) -> Vec<(u32, f64)> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|id| (id, self.scores[id as usize]))
            .collect()
    }

    /// Get the score for a specific node
    pub fn score(&self, node: u32) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }

    /// Check if there are no scored nodes
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
