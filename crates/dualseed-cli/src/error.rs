//! Error types for the pipeline orchestrator
//!
//! Messages are operator-facing: they name the failing step or input and
//! what to check next.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A command-line value failed validation
    #[error("{0}")]
    InvalidArgument(String),

    /// A step ran and exited abnormally
    #[error("Pipeline failed at step {step}: {title} (exit code {})", display_code(*.exit_code))]
    StepFailed {
        step: usize,
        title: String,
        exit_code: Option<i32>,
    },

    /// A step's command could not be started
    #[error("Pipeline failed at step {step}: {title} (could not start '{program}': {source})")]
    StepSpawn {
        step: usize,
        title: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Expected seed file not found: {}", .0.display())]
    SeedArtifactMissing(PathBuf),

    #[error("No app_user IDs found in seed file: {}", .0.display())]
    NoUserIdsInArtifact(PathBuf),

    #[error("Invalid seed artifact pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}. Check dualseed.toml.")]
    Config(String),

    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] dualseed_common::SeedError),
}

fn display_code(code: Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl PipelineError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit code for this error
    ///
    /// A failed step surfaces its own exit status; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::StepFailed {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}
