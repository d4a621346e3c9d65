//! Command-line interface definitions and argument parsing

use clap::Parser;

/// Customer segmentation CLI using K-Means clustering on offer redemptions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the offers CSV file
    #[arg(long, default_value = "assets/offers.csv")]
    pub offers: String,

    /// Path to the transactions CSV file
    #[arg(long, default_value = "assets/transactions.csv")]
    pub transactions: String,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value = "4")]
    pub clusters: usize,

    /// Random seed shared by the PCA projection and K-Means seeding
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Maximum iterations for the K-Means algorithm
    #[arg(long, default_value = "100")]
    pub max_iters: usize,

    /// Optional path for exporting the intermediate pivot CSV
    #[arg(long)]
    pub pivot_out: Option<String>,

    /// Output path for the trained model artifact
    #[arg(long, default_value = "retail_clusters.json")]
    pub model: String,

    /// Output path for the cluster scatter plot
    #[arg(short, long, default_value = "segments.png")]
    pub output: String,

    /// Output path for the elbow curve plot (sweep mode)
    #[arg(long, default_value = "elbow.png")]
    pub elbow_output: String,

    /// Sweep mode: inclusive cluster-count range as comma-separated string
    /// Example: --sweep "2,20" fits one model per k from 2 through 20
    #[arg(short, long)]
    pub sweep: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the cluster-count range from the sweep string
    /// Expected format: "k_min,k_max"
    pub fn parse_sweep_range(&self) -> anyhow::Result<Option<(usize, usize)>> {
        if let Some(ref sweep_str) = self.sweep {
            let parts: Vec<&str> = sweep_str.split(',').collect();
            if parts.len() != 2 {
                anyhow::bail!("Sweep range must be in format 'k_min,k_max'");
            }

            let k_min: usize = parts[0]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid k_min value: {}", parts[0]))?;
            let k_max: usize = parts[1]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid k_max value: {}", parts[1]))?;

            if k_min < 1 || k_min > k_max {
                anyhow::bail!("Sweep range must satisfy 1 <= k_min <= k_max");
            }

            Ok(Some((k_min, k_max)))
        } else {
            Ok(None)
        }
    }
}
