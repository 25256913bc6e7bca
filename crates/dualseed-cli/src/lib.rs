//! dualseed Pipeline Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Orchestrates the seven steps that seed PostgreSQL and MongoDB from the
//! anime CSV extracts.
//!
//! # Overview
//!
//! - **Pipeline**: fail-fast driver over the step descriptors ([`pipeline`])
//! - **Seed artifacts**: `app_user` id recovery from generated SQL ([`seed_artifact`])
//! - **Configuration**: script and binary locations from `dualseed.toml` ([`config`])
//! - **Progress**: the `[i/7]` step bar ([`progress`])

pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod seed_artifact;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOptions, UserIdSource};
pub use seed_artifact::SeedArtifactParser;

use clap::{ArgGroup, Parser};
use dualseed_common::user_ids::parse_user_ids;
use dualseed_common::ProgressMode;
use std::path::PathBuf;

/// dualseed - run the full seeding pipeline
#[derive(Parser, Debug)]
#[command(name = "dualseed")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("ids").args(["user_ids", "user_ids_file"])))]
pub struct Cli {
    /// Number of anime IDs to sample for SQL DML generation
    #[arg(long, allow_negative_numbers = true)]
    pub n: i64,

    /// Comma-separated app_user IDs for document generation (derived from the app_user seed when omitted)
    #[arg(long)]
    pub user_ids: Option<String>,

    /// File containing app_user IDs (comma or newline separated)
    #[arg(long)]
    pub user_ids_file: Option<PathBuf>,

    /// Optional random seed for SQL DML generation
    #[arg(long)]
    pub seed: Option<i64>,

    /// Optional PostgreSQL connection string override
    #[arg(long)]
    pub sql_connection_string: Option<String>,

    /// Optional MongoDB connection string override
    #[arg(long)]
    pub nosql_connection_string: Option<String>,

    /// Clear Mongo users/ratings collections before insert
    #[arg(long)]
    pub nosql_clear: bool,

    /// Mongo insert batch size
    #[arg(long, default_value_t = pipeline::DEFAULT_NOSQL_BATCH_SIZE, allow_negative_numbers = true)]
    pub nosql_batch_size: i64,

    /// Progress display mode for the pipeline and its steps
    #[arg(long, value_enum, default_value_t = ProgressMode::Linear)]
    pub progress: ProgressMode,

    /// Project root; every step runs with this as its working directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Pipeline config file (defaults to <root>/dualseed.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Turn parsed flags into validated run options
    pub fn options(&self) -> Result<PipelineOptions> {
        let user_ids = match (&self.user_ids, &self.user_ids_file) {
            (Some(raw), _) => UserIdSource::Explicit(parse_user_ids(raw)?),
            (None, Some(path)) => UserIdSource::File(path.clone()),
            (None, None) => UserIdSource::Derive,
        };

        let mut options = PipelineOptions::new(self.n)
            .with_user_ids(user_ids)
            .with_nosql_clear(self.nosql_clear)
            .with_nosql_batch_size(self.nosql_batch_size)
            .with_progress(self.progress);
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }
        if let Some(url) = &self.sql_connection_string {
            options = options.with_sql_connection_string(url.clone());
        }
        if let Some(url) = &self.nosql_connection_string {
            options = options.with_nosql_connection_string(url.clone());
        }
        Ok(options)
    }

    /// Load the pipeline config for this invocation
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::discover(&self.root, self.config.as_deref())
    }
}
