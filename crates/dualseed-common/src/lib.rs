//! dualseed Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the dualseed workspace.
//!
//! # Overview
//!
//! This crate provides functionality used by both the ingest tool and the
//! pipeline orchestrator:
//!
//! - **Error Handling**: [`SeedError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Progress**: the `off` / `linear` / `detailed` progress selector
//! - **User IDs**: parsing of comma- or newline-separated identifier lists
//!
//! # Example
//!
//! ```no_run
//! use dualseed_common::user_ids::parse_user_ids_file;
//!
//! fn main() -> dualseed_common::Result<()> {
//!     let ids = parse_user_ids_file("dml/document-seeds/user_ids.txt")?;
//!     println!("{} user ids", ids.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod progress;
pub mod user_ids;

// Re-export commonly used types
pub use error::{Result, SeedError};
pub use progress::ProgressMode;
