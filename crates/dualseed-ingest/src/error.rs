//! Error types for the ingest tool

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised while extracting, loading or generating seed documents
#[derive(Error, Debug)]
pub enum IngestError {
    /// The CSV header does not declare the requested column
    #[error("Missing columns in CSV {}: {column}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error with {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch usernames from PostgreSQL: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No valid users found in app_user for provided IDs.")]
    EmptyUserDirectory,

    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error(
        "Missing PostgreSQL connection string. Pass it with --sql-connection-string \
         or set SQL_DATABASE_URL environment variable."
    )]
    MissingConnectionString,

    #[error("Invalid distinct plan {}: {message}", path.display())]
    Plan { path: PathBuf, message: String },

    /// A distinct job could not start, so none of its columns were read
    #[error("Job for {} was skipped: {message}", path.display())]
    JobSkipped { path: PathBuf, message: String },

    #[error(transparent)]
    Common(#[from] dualseed_common::SeedError),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
