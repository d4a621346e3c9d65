//! Error types shared across the segmentation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the segmentation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A CSV record did not decode into the expected fields. Preprocessing
    /// aborts immediately: the pivot column set depends on the full dataset,
    /// so a partial pivot would be unsafe.
    #[error("malformed row in {}: {source}", .path.display())]
    MalformedRow {
        /// File the row came from.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: csv::Error,
    },

    /// A transaction references an offer id absent from the offers table.
    #[error("transaction for {last_name} references unknown offer {offer_id}")]
    UnknownOfferReference {
        /// The dangling offer id.
        offer_id: u32,
        /// Customer key of the offending transaction.
        last_name: String,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {distinct} distinct vectors")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of distinct feature vectors in the dataset.
        distinct: usize,
    },

    /// A quality metric is undefined for this model (k = 1, or coincident
    /// centroids).
    #[error("degenerate metric: {0}")]
    DegenerateMetric(String),

    /// File read/write failure, with the offending path.
    #[error("i/o failure on {}: {source}", .path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying i/o error.
        #[source]
        source: std::io::Error,
    },

    /// A numeric routine was invoked on zero vectors.
    #[error("empty input")]
    EmptyInput,

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A stored model artifact failed to decode.
    #[error("malformed model artifact {}: {source}", .path.display())]
    MalformedArtifact {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
