//! SegmentForge: Customer Segmentation CLI using K-Means clustering on
//! promotional-offer redemptions
//!
//! This is the main entrypoint that orchestrates data loading, pivoting,
//! model fitting, evaluation, visualization, and persistence. Each stage is
//! an explicit call taking and returning values; there is no shared mutable
//! pipeline state.

use anyhow::Result;
use clap::Parser;
use segmentforge::{
    evaluate, fit_kmeans, join, read_offers, read_transactions, save_model, sweep_cluster_counts,
    viz, Args, Error, KMeansConfig, ModelArtifact, PcaModel, PivotTable,
};
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("SegmentForge - Customer Segmentation using K-Means");
        println!("==================================================\n");
    }

    // Check if in sweep (elbow method) mode
    if let Some((k_min, k_max)) = args.parse_sweep_range()? {
        run_sweep(&args, k_min, k_max)?;
    } else {
        run_full_pipeline(&args)?;
    }

    Ok(())
}

/// Load both tables, join them, and pivot to per-customer count vectors
fn load_pivot(args: &Args) -> Result<PivotTable> {
    if args.verbose {
        println!("  Offers file: {}", args.offers);
        println!("  Transactions file: {}", args.transactions);
    }

    let offers = read_offers(Path::new(&args.offers))?;
    let transactions = read_transactions(Path::new(&args.transactions))?;
    if args.verbose {
        println!("  Offers: {}", offers.len());
        println!("  Transactions: {}", transactions.len());
    }

    let joined = join(&offers, &transactions)?;
    let pivot = PivotTable::from_records(&joined);

    println!(
        "✓ Data loaded: {} customers, {} offer columns",
        pivot.len(),
        pivot.dimension()
    );
    Ok(pivot)
}

/// Run the full clustering pipeline: pivot, project, fit, evaluate, plot,
/// persist
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Full Clustering Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load, join, and pivot data
    if args.verbose {
        println!("Step 1: Loading and pivoting data");
    }
    let data_start = Instant::now();
    let pivot = load_pivot(args)?;
    if args.verbose {
        println!("  Processing time: {:.2}s", data_start.elapsed().as_secs_f64());
    }

    if let Some(ref pivot_out) = args.pivot_out {
        pivot.save_csv(Path::new(pivot_out))?;
        println!("✓ Pivot exported to: {}", pivot_out);
    }

    // Step 2: Fit the 2-D projection for visualization
    if args.verbose {
        println!("\nStep 2: Fitting PCA projection");
        println!("  Seed: {}", args.seed);
    }
    let pca = PcaModel::fit(&pivot.counts, 2, args.seed)?;
    let projected = pca.project(&pivot.counts)?;
    println!("✓ PCA projection fitted");

    // Step 3: Fit K-Means model
    if args.verbose {
        println!("\nStep 3: Fitting K-Means model");
        println!("  Number of clusters: {}", args.clusters);
        println!("  Max iterations: {}", args.max_iters);
        println!("  Seed: {}", args.seed);
    }
    let model_start = Instant::now();
    let config = KMeansConfig::new(args.clusters)
        .with_max_iters(args.max_iters)
        .with_seed(args.seed);
    let model = fit_kmeans(&pivot.counts, &config)?;

    println!("✓ Model fitted successfully");
    if args.verbose {
        println!("  Fitting time: {:.2}s", model_start.elapsed().as_secs_f64());
        println!("  Iterations: {}", model.n_iterations);
        println!("  Inertia: {:.2}", model.inertia);
    }

    // Step 4: Evaluate and report metrics
    match evaluate(&model, &pivot.counts) {
        Ok(metrics) => viz::print_metrics_summary(&metrics),
        Err(Error::DegenerateMetric(reason)) => {
            let avg = segmentforge::average_min_distance(&model, &pivot.counts)?;
            println!("\n=== Metrics for Customer Segmentation ===");
            println!("Average min distance: {:.2}", avg);
            println!("Davies-Bouldin Index: undefined ({})", reason);
        }
        Err(err) => return Err(err.into()),
    }
    viz::print_cluster_statistics(&model.labels, model.k);

    // Step 5: Generate visualization
    if args.verbose {
        println!("\nStep 4: Generating visualization");
        println!("  Output file: {}", args.output);
    }
    let points: Vec<(f64, f64, usize)> = projected
        .iter()
        .zip(&model.labels)
        .map(|(p, &cluster)| (p.x, p.y, cluster))
        .collect();
    viz::plot_cluster_scatter(&points, &args.output, None)?;

    // Step 6: Persist the trained pipeline state
    let artifact = ModelArtifact {
        offer_ids: pivot.offer_ids.clone(),
        pca,
        kmeans: model,
    };
    save_model(&artifact, Path::new(&args.model))?;
    println!("✓ Model saved: {}", args.model);

    println!("\n=== Pipeline Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Run the elbow-method sweep over a range of cluster counts
fn run_sweep(args: &Args, k_min: usize, k_max: usize) -> Result<()> {
    println!("=== Cluster Count Sweep (Elbow Method) ===\n");

    let start_time = Instant::now();

    let pivot = load_pivot(args)?;

    if args.verbose {
        println!("\nSweeping k from {} to {}", k_min, k_max);
        println!("  Seed: {}", args.seed);
    }

    let losses = sweep_cluster_counts(&pivot.counts, k_min, k_max, args.max_iters, args.seed)?;

    println!("\n  k | loss");
    println!("----|---------");
    for point in &losses {
        println!(" {:2} | {:.4}", point.k, point.loss);
    }
    println!();

    viz::plot_elbow_curve(&losses, &args.elbow_output)?;

    println!("\n=== Sweep Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
