//! Principal component analysis by power iteration
//!
//! Inputs are centered, then the leading eigenvectors of the smaller of the
//! covariance (d x d) and Gram (n x n) matrices are found one at a time. Each
//! new vector is kept orthogonal to the ones already found, which deflates the
//! matrix without modifying it. Output columns are sign-normalized so the
//! entry with the largest magnitude is positive.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::types::EmbeddingVector;

/// Relative eigenvalue below which a component counts as having no variance
const VANISHING_VARIANCE: f64 = 1e-10;

/// Seeded PCA projection
#[derive(Debug, Clone)]
pub struct Pca {
    /// Requested output dimension
    pub target_dimensions: usize,
    /// Seed for the power-iteration start vectors
    pub seed: u64,
    /// Power-iteration cap per component
    pub max_iterations: usize,
    /// Change in the eigenvector (L2) counted as converged
    pub tolerance: f64,
}

impl Default for Pca {
    fn default() -> Self {
        Self {
            target_dimensions: 5,
            seed: 42,
            max_iterations: 500,
            tolerance: 1e-9,
        }
    }
}

impl Pca {
    pub fn new(target_dimensions: usize) -> Self {
        Self {
            target_dimensions,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Output dimension for `n` vectors of length `d`
    pub fn effective_dimensions(&self, n: usize, d: usize) -> usize {
        self.target_dimensions.min(n).min(d)
    }

    /// Project every vector onto the leading principal components
    ///
    /// All inputs must share one length. The output is aligned with the input
    /// and every output vector has [`Pca::effective_dimensions`] entries.
    pub fn fit_transform(&self, vectors: &[EmbeddingVector]) -> Vec<EmbeddingVector> {
        let n = vectors.len();
        let d = vectors.first().map_or(0, Vec::len);
        let dims = self.effective_dimensions(n, d);
        if dims == 0 {
            return vec![Vec::new(); n];
        }

        let centered = center(vectors, d);
        let use_gram = n < d;
        let m = if use_gram { n } else { d };
        let matrix = if use_gram {
            gram(&centered, n, d)
        } else {
            covariance(&centered, n, d)
        };
        let trace: f64 = (0..m).map(|i| matrix[i * m + i]).sum();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut basis: Vec<Vec<f64>> = Vec::with_capacity(dims);
        // scores[c][i]: coordinate of input i on component c
        let mut scores: Vec<Vec<f64>> = Vec::with_capacity(dims);

        for _ in 0..dims {
            let (vector, eigenvalue) = self.leading_eigenvector(&matrix, m, &basis, &mut rng);
            let vanishing = eigenvalue <= VANISHING_VARIANCE * trace.max(f64::MIN_POSITIVE);

            let mut column = if vanishing {
                vec![0.0; n]
            } else if use_gram {
                // X v = sqrt(n * lambda) u for the unit Gram eigenvector u
                let scale = (eigenvalue * n as f64).sqrt();
                vector.iter().map(|u| u * scale).collect()
            } else {
                (0..n)
                    .map(|i| dot(&centered[i * d..(i + 1) * d], &vector))
                    .collect()
            };
            normalize_sign(&mut column);
            scores.push(column);
            basis.push(vector);
        }

        debug!(inputs = n, input_dims = d, output_dims = dims, use_gram, "projected embeddings");

        (0..n)
            .map(|i| scores.iter().map(|column| column[i] as f32).collect())
            .collect()
    }

    /// Power iteration for the largest eigenpair orthogonal to `basis`
    fn leading_eigenvector(
        &self,
        matrix: &[f64],
        m: usize,
        basis: &[Vec<f64>],
        rng: &mut StdRng,
    ) -> (Vec<f64>, f64) {
        let mut v: Vec<f64> = (0..m).map(|_| rng.gen_range(-1.0..1.0)).collect();
        orthogonalize(&mut v, basis);
        if normalize(&mut v) == 0.0 {
            return (v, 0.0);
        }

        for _ in 0..self.max_iterations {
            let mut next = mat_vec(matrix, m, &v);
            orthogonalize(&mut next, basis);
            if normalize(&mut next) == 0.0 {
                return (v, 0.0);
            }
            let change: f64 = next
                .iter()
                .zip(&v)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
            v = next;
            if change <= self.tolerance {
                break;
            }
        }

        let eigenvalue = dot(&v, &mat_vec(matrix, m, &v)).max(0.0);
        (v, eigenvalue)
    }
}

/// Row-major n x d matrix of mean-centered inputs
fn center(vectors: &[EmbeddingVector], d: usize) -> Vec<f64> {
    let n = vectors.len() as f64;
    let mut mean = vec![0.0f64; d];
    for v in vectors {
        for (m, &x) in mean.iter_mut().zip(v) {
            *m += x as f64;
        }
    }
    for m in &mut mean {
        *m /= n;
    }
    vectors
        .iter()
        .flat_map(|v| v.iter().zip(&mean).map(|(&x, m)| x as f64 - m))
        .collect()
}

fn covariance(x: &[f64], n: usize, d: usize) -> Vec<f64> {
    let mut c = vec![0.0f64; d * d];
    for row in x.chunks_exact(d) {
        for a in 0..d {
            if row[a] == 0.0 {
                continue;
            }
            for b in a..d {
                c[a * d + b] += row[a] * row[b];
            }
        }
    }
    for a in 0..d {
        for b in a..d {
            let value = c[a * d + b] / n as f64;
            c[a * d + b] = value;
            c[b * d + a] = value;
        }
    }
    c
}

/// X Xᵀ / n, which shares its non-zero eigenvalues with the covariance
fn gram(x: &[f64], n: usize, d: usize) -> Vec<f64> {
    let mut g = vec![0.0f64; n * n];
    for i in 0..n {
        for j in i..n {
            let value = dot(&x[i * d..(i + 1) * d], &x[j * d..(j + 1) * d]) / n as f64;
            g[i * n + j] = value;
            g[j * n + i] = value;
        }
    }
    g
}

fn mat_vec(matrix: &[f64], m: usize, v: &[f64]) -> Vec<f64> {
    matrix.chunks_exact(m).map(|row| dot(row, v)).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn orthogonalize(v: &mut [f64], basis: &[Vec<f64>]) {
    for b in basis {
        let projection = dot(v, b);
        for (x, y) in v.iter_mut().zip(b) {
            *x -= projection * y;
        }
    }
}

/// Scale to unit length; returns the original norm (0 leaves `v` untouched)
fn normalize(v: &mut [f64]) -> f64 {
    let norm = dot(v, v).sqrt();
    if norm > 1e-300 {
        for x in v.iter_mut() {
            *x /= norm;
        }
        norm
    } else {
        0.0
    }
}

fn normalize_sign(column: &mut [f64]) {
    let pivot = column
        .iter()
        .copied()
        .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        for x in column.iter_mut() {
            *x = -*x;
        }
    }
}
