//! SegmentForge: A Rust CLI application for customer segmentation from
//! promotional-offer redemptions
//!
//! Offers and transactions are joined and pivoted into per-customer
//! redemption-count vectors, clustered with K-Means (k-means++ seeding),
//! scored with average minimum distance and the Davies-Bouldin index,
//! projected to 2-D with seeded PCA for plotting, and optionally swept
//! over a range of cluster counts (elbow method).

pub mod cli;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pca;
pub mod store;
pub mod sweep;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{join, read_offers, read_transactions, JoinedRecord, Offer, PivotTable, Transaction};
pub use error::{Error, Result};
pub use metrics::{average_min_distance, davies_bouldin, evaluate, ClusterMetrics};
pub use model::{fit_kmeans, ClusterAssignment, KMeansConfig, KMeansModel};
pub use pca::{PcaModel, ProjectedPoint};
pub use store::{load_model, save_model, ModelArtifact};
pub use sweep::{sweep_cluster_counts, KLoss};
