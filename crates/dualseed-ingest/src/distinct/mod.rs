//! Distinct value extraction
//!
//! Reads one column across every row of a CSV extract, explodes list-like
//! cells (see [`cell`]) and writes the sorted distinct values, one per line,
//! to `<output_dir>/<column>_distinct.txt`.
//!
//! Columns are independent: a column missing from the header fails on its
//! own and its siblings are still written.

pub mod cell;

use crate::error::{IngestError, Result};
use crate::tabular::{self, Header};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub use cell::{classify_cell, CellValue};

/// Split a comma-separated column list, dropping blanks
pub fn parse_columns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|col| !col.is_empty())
        .map(str::to_string)
        .collect()
}

/// Output file for a column
pub fn output_file(output_dir: &Path, column: &str) -> PathBuf {
    output_dir.join(format!("{column}_distinct.txt"))
}

/// Extracts distinct values from CSV columns
#[derive(Debug, Clone, Copy)]
pub struct DistinctExtractor {
    encoding: &'static Encoding,
    show_progress: bool,
}

impl DistinctExtractor {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Sorted distinct non-empty values of `column`
    pub fn extract(&self, csv_path: &Path, column: &str) -> Result<Vec<String>> {
        let mut reader = tabular::open_csv(csv_path, self.encoding)?;
        let header = Header::read(&mut reader, csv_path)?;
        let index = header.require(column, csv_path)?;

        let pb = tabular::row_progress(csv_path, &format!("Distinct {column}"), self.show_progress)?;
        let mut distinct = BTreeSet::new();
        let mut rows = 0u64;

        for record in reader.records() {
            let record = record.map_err(|e| IngestError::csv(csv_path, e))?;
            rows += 1;
            pb.inc(1);

            let raw = tabular::field(&record, Some(index));
            distinct.extend(classify_cell(raw).into_values());
        }
        pb.finish_and_clear();

        debug!(column, rows, distinct = distinct.len(), "Finished iteration over rows");
        Ok(distinct.into_iter().collect())
    }

    /// Extract `column` and write its distinct file under `output_dir`
    pub fn extract_to_file(&self, csv_path: &Path, column: &str, output_dir: &Path) -> Result<PathBuf> {
        let values = self.extract(csv_path, column)?;
        let path = output_file(output_dir, column);
        write_values(&path, &values)?;
        info!(column, values = values.len(), path = %path.display(), "Wrote distinct values");
        Ok(path)
    }
}

/// Sorted distinct values of `column` in `source`, decoded from `encoding`
pub fn extract_distinct(source: &Path, column: &str, encoding: &'static Encoding) -> Result<Vec<String>> {
    DistinctExtractor::new(encoding).extract(source, column)
}

fn write_values(path: &Path, values: &[String]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| IngestError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for value in values {
        writeln!(writer, "{value}").map_err(|e| IngestError::io(path, e))?;
    }
    writer.flush().map_err(|e| IngestError::io(path, e))
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

/// One source file and the columns to extract from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinctJob {
    pub csv_path: PathBuf,
    pub columns: Vec<String>,
    pub output_dir: PathBuf,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

/// A set of distinct jobs, read from TOML. Relative paths are taken from
/// the plan file's directory:
///
/// ```toml
/// [[job]]
/// csv_path = "datasets/anime.csv"
/// columns = ["genres", "studios"]
/// output_dir = "distinct"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinctPlan {
    #[serde(rename = "job", default)]
    pub jobs: Vec<DistinctJob>,
}

impl DistinctPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
        let plan: Self = toml::from_str(&content).map_err(|e| IngestError::Plan {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if plan.jobs.is_empty() {
            return Err(IngestError::Plan {
                path: path.to_path_buf(),
                message: "no [[job]] entries".to_string(),
            });
        }
        Ok(plan)
    }

    /// Resolve relative paths against `base` (the plan file's directory)
    pub fn relative_to(mut self, base: &Path) -> Self {
        for job in &mut self.jobs {
            if job.csv_path.is_relative() {
                job.csv_path = base.join(&job.csv_path);
            }
            if job.output_dir.is_relative() {
                job.output_dir = base.join(&job.output_dir);
            }
        }
        self
    }
}

/// Per-column results of a distinct run
#[derive(Debug, Default)]
pub struct DistinctReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<(String, IngestError)>,
}

impl DistinctReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run one job, continuing past per-column failures
///
/// Errors that affect every column (unknown encoding, unwritable output
/// directory) are returned directly.
pub fn run_job(job: &DistinctJob, show_progress: bool) -> Result<DistinctReport> {
    let encoding = tabular::resolve_encoding(&job.encoding)?;
    std::fs::create_dir_all(&job.output_dir).map_err(|e| IngestError::io(&job.output_dir, e))?;

    let extractor = DistinctExtractor::new(encoding).with_progress(show_progress);
    let mut report = DistinctReport::default();

    for column in &job.columns {
        info!(column, csv = %job.csv_path.display(), "Extracting distinct values");
        match extractor.extract_to_file(&job.csv_path, column, &job.output_dir) {
            Ok(path) => report.written.push(path),
            Err(e) => {
                error!(column, error = %e, "Distinct extraction failed");
                report.failures.push((column.clone(), e));
            },
        }
    }

    Ok(report)
}

/// Run every job of a plan, merging the per-column results
///
/// A job that cannot start records a failure for each of its columns and
/// the remaining jobs still run.
pub fn run_plan(plan: &DistinctPlan, show_progress: bool) -> DistinctReport {
    let mut report = DistinctReport::default();
    for job in &plan.jobs {
        match run_job(job, show_progress) {
            Ok(job_report) => {
                report.written.extend(job_report.written);
                report.failures.extend(job_report.failures);
            },
            Err(e) => {
                error!(csv = %job.csv_path.display(), error = %e, "Distinct job skipped");
                let message = e.to_string();
                report.failures.extend(job.columns.iter().map(|column| {
                    let skipped = IngestError::JobSkipped {
                        path: job.csv_path.clone(),
                        message: message.clone(),
                    };
                    (column.clone(), skipped)
                }));
            },
        }
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use tempfile::TempDir;

    #[test]
    fn test_parse_columns() {
        assert_eq!(parse_columns("genres, studios,,  "), vec!["genres", "studios"]);
        assert!(parse_columns(" , ").is_empty());
    }

    #[test]
    fn test_extract_mixed_cells() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("anime.csv");
        std::fs::write(
            &csv,
            "title,genres\nA,\"[\"\"a\"\", \"\"b\"\"]\"\nB,\"['a','b']\"\nC,plain\nD,\n",
        )
        .unwrap();

        let values = DistinctExtractor::new(UTF_8).extract(&csv, "genres").unwrap();
        assert_eq!(values, vec!["a", "b", "plain"]);
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("anime.csv");
        std::fs::write(&csv, "title\nA\n").unwrap();

        let err = DistinctExtractor::new(UTF_8).extract(&csv, "genres").unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "genres"));
    }

    #[test]
    fn test_plan_parsing_defaults_encoding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("distinct.toml");
        std::fs::write(
            &path,
            "[[job]]\ncsv_path = \"a.csv\"\ncolumns = [\"x\"]\noutput_dir = \"out\"\n",
        )
        .unwrap();

        let plan = DistinctPlan::load(&path).unwrap().relative_to(dir.path());
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].encoding, "utf-8");
        assert_eq!(plan.jobs[0].csv_path, dir.path().join("a.csv"));
    }

    #[test]
    fn test_empty_plan_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("distinct.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(DistinctPlan::load(&path), Err(IngestError::Plan { .. })));
    }
}
