//! Visualization functions using Plotters for cluster and elbow analysis

use anyhow::Result;
use plotters::prelude::*;
use std::collections::BTreeSet;

use crate::metrics::ClusterMetrics;
use crate::sweep::KLoss;

/// Color palette for different clusters
const CLUSTER_COLORS: [RGBColor; 6] = [RED, BLUE, GREEN, MAGENTA, CYAN, YELLOW];

fn cluster_color(cluster: usize) -> RGBColor {
    if cluster < CLUSTER_COLORS.len() {
        CLUSTER_COLORS[cluster]
    } else {
        BLACK // Fallback color
    }
}

/// Create a scatter plot of PCA-projected customers colored by cluster
///
/// # Arguments
/// * `points` - One `(x, y, cluster)` triple per customer
/// * `output_path` - Path to save the PNG plot
/// * `plot_title` - Title for the plot
pub fn plot_cluster_scatter(
    points: &[(f64, f64, usize)],
    output_path: &str,
    plot_title: Option<&str>,
) -> Result<()> {
    if points.is_empty() {
        anyhow::bail!("No points to plot");
    }
    let title = plot_title.unwrap_or("Customer Segmentation");

    // Calculate plot bounds with some padding
    let x_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min) - 0.5;
    let x_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max) + 0.5;
    let y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min) - 0.5;
    let y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max) + 0.5;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("PCA Component 1")
        .y_desc("PCA Component 2")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // One series per cluster so each gets a legend entry
    let cluster_ids: BTreeSet<usize> = points.iter().map(|p| p.2).collect();
    for cluster in cluster_ids {
        let color = cluster_color(cluster);
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|p| p.2 == cluster)
                    .map(|&(x, y, _)| Circle::new((x, y), 4, color.filled())),
            )?
            .label(format!("Cluster {}", cluster))
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    chart.configure_series_labels().draw()?;

    root.present()?;
    println!("Cluster scatter saved to: {}", output_path);

    Ok(())
}

/// Create a line plot of loss against cluster count (elbow method)
pub fn plot_elbow_curve(losses: &[KLoss], output_path: &str) -> Result<()> {
    if losses.is_empty() {
        anyhow::bail!("No sweep results to plot");
    }

    let k_min = losses.iter().map(|p| p.k).min().unwrap_or(0) as f64;
    let k_max = losses.iter().map(|p| p.k).max().unwrap_or(0) as f64;
    let loss_max = losses.iter().map(|p| p.loss).fold(f64::NEG_INFINITY, f64::max);

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Elbow Method", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((k_min - 0.5)..(k_max + 0.5), -0.1..(loss_max * 1.1 + 0.1))?;

    chart
        .configure_mesh()
        .x_desc("k")
        .y_desc("loss")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(
        losses.iter().map(|p| (p.k as f64, p.loss)),
        &BLUE,
    ))?;
    chart.draw_series(
        losses
            .iter()
            .map(|p| Circle::new((p.k as f64, p.loss), 4, BLUE.filled())),
    )?;

    root.present()?;
    println!("Elbow curve saved to: {}", output_path);

    Ok(())
}

/// Print the quality-metric summary to the console
pub fn print_metrics_summary(metrics: &ClusterMetrics) {
    println!("\n=== Metrics for Customer Segmentation ===");
    println!("Average min distance: {:.2}", metrics.avg_min_distance);
    println!("Davies-Bouldin Index: {:.2}", metrics.davies_bouldin);
}

/// Print per-cluster sizes and centroid summary to the console
pub fn print_cluster_statistics(labels: &[usize], k: usize) {
    let mut sizes = vec![0usize; k];
    for &label in labels {
        if label < k {
            sizes[label] += 1;
        }
    }

    println!("\n=== Cluster Statistics ===");
    println!("Number of clusters: {}", k);
    println!("Total customers: {}", labels.len());
    println!("\nCluster sizes:");
    for (i, &size) in sizes.iter().enumerate() {
        let percentage = (size as f64 / labels.len() as f64) * 100.0;
        println!("  Cluster {}: {} customers ({:.1}%)", i, size, percentage);
    }
}
