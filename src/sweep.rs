//! Elbow-method sweep over a range of cluster counts.

use ndarray::Array2;
use serde::Serialize;

use crate::error::Result;
use crate::metrics::average_min_distance;
use crate::model::{fit_kmeans, KMeansConfig};

/// One elbow-curve sample: the cluster count and its loss.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KLoss {
    pub k: usize,
    pub loss: f64,
}

/// Fit and score one model per k in the inclusive range `[k_min, k_max]`,
/// each with the shared `seed`, using average minimum distance as the loss.
///
/// Results are ascending in k. Any per-k failure (for example k exceeding
/// the distinct-vector count) aborts the whole sweep with that error — a
/// gap in the elbow curve would be misleading.
pub fn sweep_cluster_counts(
    data: &Array2<f64>,
    k_min: usize,
    k_max: usize,
    max_iters: usize,
    seed: u64,
) -> Result<Vec<KLoss>> {
    let mut results = Vec::new();
    for k in k_min..=k_max {
        let config = KMeansConfig::new(k)
            .with_max_iters(max_iters)
            .with_seed(seed);
        let model = fit_kmeans(data, &config)?;
        let loss = average_min_distance(&model, data)?;
        results.push(KLoss { k, loss });
    }
    Ok(results)
}
