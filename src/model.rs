//! K-Means clustering over pivot vectors, with k-means++ seeding.

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a K-Means fit.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters.
    pub k: usize,
    /// Iteration cap; the fit stops earlier once assignments are stable.
    pub max_iters: usize,
    /// Random seed for k-means++ seeding.
    pub seed: u64,
}

impl KMeansConfig {
    /// Create a configuration for `k` clusters with the default iteration
    /// cap and seed.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iters: 100,
            seed: 0,
        }
    }

    /// Set the iteration cap.
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Fitted K-Means model. Immutable after fitting; re-fitting produces a new
/// model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeansModel {
    /// Number of clusters.
    pub k: usize,
    /// Cluster centroids, shape `(k, d)`.
    pub centroids: Array2<f64>,
    /// Cluster assignment per training vector.
    pub labels: Vec<usize>,
    /// Euclidean distance of each training vector to its assigned centroid.
    pub distances: Vec<f64>,
    /// Within-cluster sum of squares.
    pub inertia: f64,
    /// Lloyd iterations run before convergence or the cap.
    pub n_iterations: usize,
}

/// Nearest-centroid lookup result: the assigned cluster and the Euclidean
/// distance to every centroid.
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    pub cluster: usize,
    pub distances: Vec<f64>,
}

impl KMeansModel {
    /// Assign a vector to its nearest centroid. Pure lookup; the model is
    /// not mutated.
    pub fn predict(&self, point: ArrayView1<'_, f64>) -> Result<ClusterAssignment> {
        let d = self.centroids.ncols();
        if point.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: point.len(),
            });
        }

        let mut distances = Vec::with_capacity(self.k);
        let mut cluster = 0;
        let mut best_sq = f64::INFINITY;
        for (idx, centroid) in self.centroids.outer_iter().enumerate() {
            let sq = squared_distance(point, centroid);
            if sq < best_sq {
                best_sq = sq;
                cluster = idx;
            }
            distances.push(sq.sqrt());
        }

        Ok(ClusterAssignment { cluster, distances })
    }

    /// Number of training vectors per cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.labels {
            if label < self.k {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

/// Fit K-Means on `data` (shape `(n, d)`).
///
/// Centroids are seeded with k-means++: the first is drawn uniformly from
/// the data, each next with probability proportional to the squared
/// distance to the nearest already-chosen centroid. Lloyd iterations then
/// alternate assignment and mean update until no assignment changes or
/// `max_iters` is reached. A centroid left without points is reseeded to
/// the point currently farthest from its assigned centroid.
///
/// The same data, `k`, and seed always produce the same model.
pub fn fit_kmeans(data: &Array2<f64>, config: &KMeansConfig) -> Result<KMeansModel> {
    let n = data.nrows();
    let d = data.ncols();
    if n == 0 || d == 0 {
        return Err(Error::EmptyInput);
    }

    let distinct = distinct_rows(data);
    if config.k < 1 || config.k > distinct {
        return Err(Error::InvalidClusterCount {
            requested: config.k,
            distinct,
        });
    }

    let k = config.k;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut centroids = seed_centroids(data, k, &mut rng);

    let mut labels = vec![0usize; n];
    let mut assigned_sq = vec![0f64; n];
    for i in 0..n {
        let (cluster, sq) = nearest_centroid(data.row(i), &centroids);
        labels[i] = cluster;
        assigned_sq[i] = sq;
    }

    let mut n_iterations = 0;
    for _ in 0..config.max_iters {
        n_iterations += 1;

        update_centroids(&mut centroids, data, &labels, &mut assigned_sq);

        let mut changed = false;
        for i in 0..n {
            let (cluster, sq) = nearest_centroid(data.row(i), &centroids);
            if labels[i] != cluster {
                labels[i] = cluster;
                changed = true;
            }
            assigned_sq[i] = sq;
        }

        if !changed {
            break;
        }
    }

    let inertia = assigned_sq.iter().sum();
    let distances = assigned_sq.iter().map(|sq| sq.sqrt()).collect();

    Ok(KMeansModel {
        k,
        centroids,
        labels,
        distances,
        inertia,
        n_iterations,
    })
}

/// k-means++ seeding over the rows of `data`.
fn seed_centroids(data: &Array2<f64>, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
    let n = data.nrows();
    let d = data.ncols();
    let mut centroids = Array2::zeros((k, d));

    let first = rng.gen_range(0..n);
    centroids.row_mut(0).assign(&data.row(first));

    let mut min_sq: Vec<f64> = (0..n)
        .map(|i| squared_distance(data.row(i), centroids.row(0)))
        .collect();

    for c in 1..k {
        let total: f64 = min_sq.iter().sum();
        let chosen = if total > 0.0 {
            weighted_pick(&min_sq, rng.gen::<f64>() * total)
        } else {
            // All remaining mass sits on already-chosen centroids; validation
            // guarantees this cannot happen while c < k, but a uniform draw
            // keeps the routine total.
            rng.gen_range(0..n)
        };
        centroids.row_mut(c).assign(&data.row(chosen));

        for i in 0..n {
            let sq = squared_distance(data.row(i), centroids.row(c));
            if sq < min_sq[i] {
                min_sq[i] = sq;
            }
        }
    }

    centroids
}

/// Pick the index whose cumulative weight first exceeds `target`. Falls
/// back to the heaviest index if floating-point drift walks past the end.
fn weighted_pick(weights: &[f64], mut target: f64) -> usize {
    let mut heaviest = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w > weights[heaviest] {
            heaviest = i;
        }
    }
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        if target < w {
            return i;
        }
        target -= w;
    }
    heaviest
}

/// Recompute each centroid as the mean of its assigned points; empty
/// centroids are reseeded to the point farthest from its assigned centroid.
fn update_centroids(
    centroids: &mut Array2<f64>,
    data: &Array2<f64>,
    labels: &[usize],
    assigned_sq: &mut [f64],
) {
    let k = centroids.nrows();
    let d = centroids.ncols();
    let n = data.nrows();

    let mut sums = Array2::<f64>::zeros((k, d));
    let mut counts = vec![0usize; k];
    for (i, &label) in labels.iter().enumerate() {
        counts[label] += 1;
        for j in 0..d {
            sums[[label, j]] += data[[i, j]];
        }
    }

    for cluster in 0..k {
        if counts[cluster] == 0 {
            continue;
        }
        for j in 0..d {
            centroids[[cluster, j]] = sums[[cluster, j]] / counts[cluster] as f64;
        }
    }

    for cluster in 0..k {
        if counts[cluster] > 0 {
            continue;
        }
        let mut farthest = 0;
        for i in 1..n {
            if assigned_sq[i] > assigned_sq[farthest] {
                farthest = i;
            }
        }
        centroids
            .row_mut(cluster)
            .assign(&data.row(farthest));
        // Consume the point so a second empty centroid picks a different one.
        assigned_sq[farthest] = 0.0;
    }
}

fn nearest_centroid(point: ArrayView1<'_, f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best = 0;
    let mut best_sq = f64::INFINITY;
    for (idx, centroid) in centroids.outer_iter().enumerate() {
        let sq = squared_distance(point, centroid);
        if sq < best_sq {
            best_sq = sq;
            best = idx;
        }
    }
    (best, best_sq)
}

pub(crate) fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Number of distinct rows, comparing exact bit patterns.
pub(crate) fn distinct_rows(data: &Array2<f64>) -> usize {
    let mut seen: HashSet<Vec<u64>> = HashSet::with_capacity(data.nrows());
    for row in data.outer_iter() {
        seen.insert(row.iter().map(|v| v.to_bits()).collect());
    }
    seen.len()
}
