//! Weighted PageRank over the sentence similarity graph
//!
//! Power iteration with uniform teleport. Sentences that share no terms with
//! any other sentence redistribute their mass uniformly.

use tracing::warn;

use super::PageRankResult;
use crate::graph::csr::CsrGraph;

/// TextRank's random walk: damping, iteration cap and L1 convergence threshold
#[derive(Debug, Clone)]
pub struct StandardPageRank {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence threshold
    pub threshold: f64,
}

impl Default for StandardPageRank {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            threshold: 1e-6,
        }
    }
}

impl StandardPageRank {
    /// Create a new StandardPageRank with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Score every sentence node of `graph`
    ///
    /// Each node spreads its score over its neighbours in proportion to edge
    /// weight; sentences without shared terms spread theirs uniformly. The
    /// result is returned even when the iteration budget runs out, with
    /// `converged == false` and a warning logged.
    pub fn run(&self, graph: &CsrGraph) -> PageRankResult {
        let n = graph.num_nodes;
        if n == 0 {
            return PageRankResult::new(Vec::new(), 0, 0.0, true);
        }

        let out_weight: Vec<f64> = (0..n as u32).map(|v| graph.node_total_weight(v)).collect();
        let isolated = graph.dangling_nodes();
        let base = (1.0 - self.damping) / n as f64;

        let mut scores = vec![1.0 / n as f64; n];
        let mut next = vec![0.0; n];
        let mut iterations = 0;
        let mut delta = f64::INFINITY;

        while iterations < self.max_iterations && delta > self.threshold {
            iterations += 1;

            let isolated_mass: f64 = isolated.iter().map(|&v| scores[v as usize]).sum();
            next.fill(base + self.damping * isolated_mass / n as f64);

            for (v, (&score, &total)) in scores.iter().zip(&out_weight).enumerate() {
                if total <= 0.0 {
                    continue;
                }
                let share = self.damping * score / total;
                for (u, weight) in graph.neighbors(v as u32) {
                    next[u as usize] += share * weight;
                }
            }

            delta = scores.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut scores, &mut next);
        }

        let sum: f64 = scores.iter().sum();
        if sum > 0.0 {
            scores.iter_mut().for_each(|s| *s /= sum);
        }

        let converged = delta <= self.threshold;
        if !converged {
            warn!(
                sentences = n,
                iterations,
                delta,
                threshold = self.threshold,
                "convergence incomplete; using best-effort TextRank scores"
            );
        }
        PageRankResult::new(scores, iterations, delta, converged)
    }
}
