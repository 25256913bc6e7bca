//! Identifier recovery from the generated `app_user` seed file
//!
//! The main-seed step writes SQL containing `INSERT ... VALUES (1, 'alice', ...), (2, ...)`.
//! The first integer of every tuple is an `app_user` id.

use crate::error::{PipelineError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

const TUPLE_ID_PATTERN: &str = r"\(\s*(\d+)\s*,";

/// Scans SQL seed text for leading tuple ids
#[derive(Debug, Clone)]
pub struct SeedArtifactParser {
    pattern: Regex,
}

impl SeedArtifactParser {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(TUPLE_ID_PATTERN)?;
        Ok(Self { pattern })
    }

    /// Distinct ids found in `sql`, ascending
    ///
    /// Integers too large for `i64` are skipped.
    pub fn parse_str(&self, sql: &str) -> Vec<i64> {
        self.pattern
            .captures_iter(sql)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().parse::<i64>().ok())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Read the artifact at `path` and return its ids
    ///
    /// A missing file and a file without any tuples are both errors.
    pub fn parse_file(&self, path: &Path) -> Result<Vec<i64>> {
        if !path.is_file() {
            return Err(PipelineError::SeedArtifactMissing(path.to_path_buf()));
        }
        let sql = std::fs::read_to_string(path)?;
        let ids = self.parse_str(&sql);
        if ids.is_empty() {
            return Err(PipelineError::NoUserIdsInArtifact(path.to_path_buf()));
        }
        tracing::debug!(path = %path.display(), count = ids.len(), "Derived user ids from seed artifact");
        Ok(ids)
    }
}
