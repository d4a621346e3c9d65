//! Persistence of the trained pipeline state.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::KMeansModel;
use crate::pca::PcaModel;

/// Everything needed to score new data the way the training run did: the
/// pivot column schema, the fitted reduction, and the fitted clusterer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Offer ids in pivot column order.
    pub offer_ids: Vec<u32>,
    /// Fitted 2-D reduction.
    pub pca: PcaModel,
    /// Fitted clusterer.
    pub kmeans: KMeansModel,
}

/// Write the artifact as JSON, replacing any existing file at `path`.
pub fn save_model(artifact: &ModelArtifact, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, artifact).map_err(|source| {
        Error::MalformedArtifact {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read an artifact previously written by [`save_model`].
pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::MalformedArtifact {
        path: path.to_path_buf(),
        source,
    })
}
