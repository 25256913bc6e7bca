//! Ingest configuration
//!
//! Paths are explicit values handed to each component; nothing in this crate
//! reads a global default on its own.

use dualseed_common::ProgressMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default dataset directory, relative to the project root
pub const DEFAULT_DATASETS_DIR: &str = "data-import/datasets";

/// Default output directory for generated document seeds
pub const DEFAULT_DOCUMENT_OUTPUT_DIR: &str = "dml/document-seeds";

/// Locations of the three username-keyed CSV extracts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    /// Per-user status counts
    pub profiles: PathBuf,
    /// Per-user rating rows
    pub ratings: PathBuf,
    /// Per-user favorite rows
    pub favorites: PathBuf,
}

impl DatasetPaths {
    /// Standard file names inside a dataset directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            profiles: dir.join("profiles.csv"),
            ratings: dir.join("ratings.csv"),
            favorites: dir.join("favs.csv"),
        }
    }
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATASETS_DIR)
    }
}

/// Configuration for document seed generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Source CSV extracts
    pub datasets: DatasetPaths,
    /// Directory receiving users.json, ratings.json and manifest.json
    pub output_dir: PathBuf,
    /// Progress display mode
    pub progress: ProgressMode,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            datasets: DatasetPaths::default(),
            output_dir: PathBuf::from(DEFAULT_DOCUMENT_OUTPUT_DIR),
            progress: ProgressMode::Detailed,
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all three extracts from `dir`
    pub fn with_datasets_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.datasets = DatasetPaths::in_dir(dir);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_progress(mut self, progress: ProgressMode) -> Self {
        self.progress = progress;
        self
    }

    pub fn users_path(&self) -> PathBuf {
        self.output_dir.join("users.json")
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.output_dir.join("ratings.json")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join("manifest.json")
    }
}
