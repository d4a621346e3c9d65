//! Principal-component projection of pivot vectors to 2-D, for plotting.
//!
//! The projection never feeds cluster assignment; it exists so a
//! 32-dimensional redemption profile can be drawn as a point. The power
//! iteration is seeded, so the same data and seed reproduce the same axes
//! on every run and platform.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Power-iteration steps per component.
const POWER_ITERATIONS: usize = 300;

/// Norms below this are treated as a vanished direction.
const NORM_EPSILON: f64 = 1e-12;

/// A feature vector projected onto the two retained axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

/// Fitted reduction: mean vector plus the retained principal directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaModel {
    /// Per-column mean of the fitted data.
    pub mean: Array1<f64>,
    /// Principal directions, shape `(rank, d)`, rows ordered by descending
    /// eigenvalue.
    pub components: Array2<f64>,
    /// Eigenvalue per retained direction.
    pub eigenvalues: Vec<f64>,
}

impl PcaModel {
    /// Fit the mean and the top `rank` principal directions of `data`
    /// (shape `(n, d)`), using power iteration with deflation on the
    /// covariance matrix. The start vector of each iteration is drawn from
    /// a rng seeded with `seed`.
    pub fn fit(data: &Array2<f64>, rank: usize, seed: u64) -> Result<Self> {
        let n = data.nrows();
        let d = data.ncols();
        if n == 0 || d == 0 {
            return Err(Error::EmptyInput);
        }
        if rank == 0 || rank > d {
            return Err(Error::DimensionMismatch {
                expected: rank,
                found: d,
            });
        }

        let mean = data.mean_axis(Axis(0)).ok_or(Error::EmptyInput)?;
        let mut centered = data.clone();
        for i in 0..n {
            for j in 0..d {
                centered[[i, j]] -= mean[j];
            }
        }

        let mut cov = centered.t().dot(&centered) / n as f64;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut components = Array2::zeros((rank, d));
        let mut eigenvalues = Vec::with_capacity(rank);

        for r in 0..rank {
            // A vanished spectrum (constant data, or fewer informative
            // directions than rank) falls back to a standard-basis axis, in
            // axis-index order, so ties and degenerate cases stay ordered
            // deterministically.
            let axis = dominant_eigenvector(&cov, &mut rng).unwrap_or_else(|| basis_axis(d, r));
            let eigenvalue = axis.dot(&cov.dot(&axis));

            for i in 0..d {
                for j in 0..d {
                    cov[[i, j]] -= eigenvalue * axis[i] * axis[j];
                }
            }

            components.row_mut(r).assign(&axis);
            eigenvalues.push(eigenvalue.max(0.0));
        }

        Ok(PcaModel {
            mean,
            components,
            eigenvalues,
        })
    }

    /// Number of retained directions.
    pub fn rank(&self) -> usize {
        self.components.nrows()
    }

    /// Project one feature vector: subtract the fitted mean, then dot with
    /// each retained direction.
    pub fn transform(&self, point: ArrayView1<'_, f64>) -> Result<ProjectedPoint> {
        if point.len() != self.mean.len() {
            return Err(Error::DimensionMismatch {
                expected: self.mean.len(),
                found: point.len(),
            });
        }

        let centered = &point.to_owned() - &self.mean;
        let x = self.components.row(0).dot(&centered);
        let y = if self.rank() > 1 {
            self.components.row(1).dot(&centered)
        } else {
            0.0
        };
        Ok(ProjectedPoint { x, y })
    }

    /// Project every row of a feature table.
    pub fn project(&self, data: &Array2<f64>) -> Result<Vec<ProjectedPoint>> {
        data.outer_iter().map(|row| self.transform(row)).collect()
    }
}

/// Dominant eigenvector of a symmetric matrix via power iteration, or
/// `None` when the spectrum has vanished.
///
/// The returned vector is unit length with a canonical sign: the
/// largest-magnitude coordinate (lowest index on ties) is positive.
fn dominant_eigenvector(matrix: &Array2<f64>, rng: &mut ChaCha8Rng) -> Option<Array1<f64>> {
    let d = matrix.nrows();

    let mut v = Array1::from_shape_fn(d, |_| rng.gen_range(-1.0..1.0));
    let norm = vector_norm(&v);
    if norm < NORM_EPSILON {
        return None;
    }
    v /= norm;

    for _ in 0..POWER_ITERATIONS {
        let next = matrix.dot(&v);
        let norm = vector_norm(&next);
        if norm < NORM_EPSILON {
            return None;
        }
        v = next / norm;
    }

    // Canonical sign keeps the fitted axes identical across runs even when
    // the iteration converges from the opposite side.
    let mut pivot = 0;
    for i in 1..d {
        if v[i].abs() > v[pivot].abs() {
            pivot = i;
        }
    }
    if v[pivot] < 0.0 {
        v.mapv_inplace(|x| -x);
    }
    Some(v)
}

fn vector_norm(v: &Array1<f64>) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn basis_axis(d: usize, index: usize) -> Array1<f64> {
    let mut axis = Array1::zeros(d);
    axis[index.min(d - 1)] = 1.0;
    axis
}
