//! Cluster-quality metrics: average minimum distance and the
//! Davies-Bouldin index.

use ndarray::Array2;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{squared_distance, KMeansModel};

/// Scalar quality scores for one model evaluated against one dataset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClusterMetrics {
    /// Mean distance of each vector to its assigned centroid.
    pub avg_min_distance: f64,
    /// Davies-Bouldin index; lower is better.
    pub davies_bouldin: f64,
}

/// Compute both metrics for `model` over `data` (training set or held-out).
///
/// Fails with [`Error::DegenerateMetric`] when the Davies-Bouldin index is
/// undefined (k = 1, or coincident centroids); callers that only need the
/// loss during a sweep should use [`average_min_distance`] directly.
pub fn evaluate(model: &KMeansModel, data: &Array2<f64>) -> Result<ClusterMetrics> {
    Ok(ClusterMetrics {
        avg_min_distance: average_min_distance(model, data)?,
        davies_bouldin: davies_bouldin(model, data)?,
    })
}

/// Mean Euclidean distance of each vector to its nearest centroid.
pub fn average_min_distance(model: &KMeansModel, data: &Array2<f64>) -> Result<f64> {
    if data.nrows() == 0 {
        return Err(Error::EmptyInput);
    }

    let mut total = 0.0;
    for row in data.outer_iter() {
        let assignment = model.predict(row)?;
        total += assignment.distances[assignment.cluster];
    }
    Ok(total / data.nrows() as f64)
}

/// Davies-Bouldin index: mean over clusters of the worst
/// (scatter_i + scatter_j) / separation_ij ratio.
///
/// Scatter is the mean intra-cluster distance to the centroid; separation
/// is the distance between centroids.
pub fn davies_bouldin(model: &KMeansModel, data: &Array2<f64>) -> Result<f64> {
    if data.nrows() == 0 {
        return Err(Error::EmptyInput);
    }
    let k = model.k;
    if k < 2 {
        return Err(Error::DegenerateMetric(
            "Davies-Bouldin index requires at least two clusters".to_string(),
        ));
    }

    let mut totals = vec![0.0; k];
    let mut counts = vec![0usize; k];
    for row in data.outer_iter() {
        let assignment = model.predict(row)?;
        totals[assignment.cluster] += assignment.distances[assignment.cluster];
        counts[assignment.cluster] += 1;
    }
    let scatter: Vec<f64> = totals
        .iter()
        .zip(&counts)
        .map(|(&total, &count)| if count == 0 { 0.0 } else { total / count as f64 })
        .collect();

    let mut sum = 0.0;
    for i in 0..k {
        let mut worst = 0.0f64;
        for j in 0..k {
            if i == j {
                continue;
            }
            let separation =
                squared_distance(model.centroids.row(i), model.centroids.row(j)).sqrt();
            if separation == 0.0 {
                return Err(Error::DegenerateMetric(format!(
                    "centroids {i} and {j} coincide"
                )));
            }
            worst = worst.max((scatter[i] + scatter[j]) / separation);
        }
        sum += worst;
    }

    Ok(sum / k as f64)
}
