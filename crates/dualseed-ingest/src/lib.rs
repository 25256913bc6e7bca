//! dualseed Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Turns the anime-list CSV extracts into seed artifacts.
//!
//! # Components
//!
//! - **distinct**: sorted distinct values per column, exploding list-like cells
//! - **loaders**: username-filtered profile, rating and favorite passes
//! - **resolve**: `app_user.id` → username lookup against PostgreSQL
//! - **documents**: `users.json` / `ratings.json` / `manifest.json` construction
//!
//! # Example
//!
//! ```no_run
//! use dualseed_ingest::{generate_document_seeds, IngestConfig, StaticKeyResolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = StaticKeyResolver::new([(1, "alice"), (2, "bob")]);
//!     let config = IngestConfig::new().with_output_dir("out");
//!     let report = generate_document_seeds(&config, &resolver, &[1, 2]).await?;
//!     println!("{} ratings", report.manifest.ratings_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod distinct;
pub mod documents;
pub mod error;
pub mod generate;
pub mod loaders;
pub mod resolve;
pub mod tabular;

pub use config::{DatasetPaths, IngestConfig};
pub use error::{IngestError, Result};
pub use generate::{generate_document_seeds, GenerationReport};
pub use resolve::{KeyResolver, PgKeyResolver, StaticKeyResolver, UserDirectory};
