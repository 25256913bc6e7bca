//! Distinct extraction tests

use dualseed_ingest::distinct::{extract_distinct, run_job, run_plan, DistinctJob, DistinctPlan};
use dualseed_ingest::tabular::resolve_encoding;
use dualseed_ingest::IngestError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ANIME: &str = "\
anime_id,title,genres,studio
1,Cowboy Bebop,\"[\"\"Action\"\", \"\"Sci-Fi\"\"]\",Sunrise
2,Monster,\"['Drama', 'Mystery',]\",Madhouse
3,Mushishi,\"[\"\"Mystery\"\", \"\"\"\"]\",Artland
4,Untagged,,Sunrise
5,Odd,[Slice of Life],  Madhouse
";

fn job(dir: &Path, columns: &[&str]) -> DistinctJob {
    let csv_path = dir.join("anime.csv");
    std::fs::write(&csv_path, ANIME).unwrap();
    DistinctJob {
        csv_path,
        columns: columns.iter().map(|c| c.to_string()).collect(),
        output_dir: dir.join("distinct"),
        encoding: "utf-8".to_string(),
    }
}

#[test]
fn test_distinct_values_written_sorted() {
    let dir = TempDir::new().unwrap();
    let report = run_job(&job(dir.path(), &["genres", "studio"]), false).unwrap();
    assert!(report.is_success());
    assert_eq!(report.written.len(), 2);

    let genres = std::fs::read_to_string(dir.path().join("distinct/genres_distinct.txt")).unwrap();
    assert_eq!(genres, "Action\nDrama\nMystery\nSci-Fi\n[Slice of Life]\n");

    let studios = std::fs::read_to_string(dir.path().join("distinct/studio_distinct.txt")).unwrap();
    assert_eq!(studios, "Artland\nMadhouse\nSunrise\n");
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let job = job(dir.path(), &["genres"]);
    let out = dir.path().join("distinct/genres_distinct.txt");

    run_job(&job, false).unwrap();
    let first = std::fs::read(&out).unwrap();
    run_job(&job, false).unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), first);
}

#[test]
fn test_row_order_does_not_matter() {
    let dir = TempDir::new().unwrap();
    let forward = dir.path().join("forward.csv");
    let reversed = dir.path().join("reversed.csv");
    std::fs::write(&forward, "tags\n\"['b', 'a']\"\nc\n").unwrap();
    std::fs::write(&reversed, "tags\nc\n\"[\"\"a\"\", \"\"b\"\"]\"\n").unwrap();

    let forward_values = extract_distinct(&forward, "tags", encoding_rs::UTF_8).unwrap();
    assert_eq!(forward_values, vec!["a", "b", "c"]);
    assert_eq!(
        extract_distinct(&reversed, "tags", encoding_rs::UTF_8).unwrap(),
        forward_values
    );
}

#[test]
fn test_missing_column_does_not_block_siblings() {
    let dir = TempDir::new().unwrap();
    let report = run_job(&job(dir.path(), &["themes", "studio"]), false).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "themes");
    assert!(matches!(report.failures[0].1, IngestError::MissingColumn { .. }));
    assert!(dir.path().join("distinct/studio_distinct.txt").exists());
    assert!(!dir.path().join("distinct/themes_distinct.txt").exists());
}

#[test]
fn test_unknown_encoding_fails_whole_job() {
    let dir = TempDir::new().unwrap();
    let mut job = job(dir.path(), &["genres"]);
    job.encoding = "not-a-charset".to_string();
    assert!(matches!(
        run_job(&job, false),
        Err(IngestError::UnknownEncoding(_))
    ));
}

#[test]
fn test_failed_job_does_not_stop_the_plan() {
    let dir = TempDir::new().unwrap();
    let mut broken = job(dir.path(), &["genres", "studio"]);
    broken.encoding = "not-a-charset".to_string();
    let mut healthy = job(dir.path(), &["title"]);
    healthy.output_dir = dir.path().join("distinct-titles");

    let report = run_plan(
        &DistinctPlan {
            jobs: vec![broken, healthy],
        },
        false,
    );

    assert!(!report.is_success());
    let failed: Vec<&str> = report.failures.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(failed, vec!["genres", "studio"]);
    assert!(report
        .failures
        .iter()
        .all(|(_, e)| matches!(e, IngestError::JobSkipped { message, .. } if message.contains("not-a-charset"))));

    assert_eq!(report.written, vec![dir.path().join("distinct-titles/title_distinct.txt")]);
    assert!(dir.path().join("distinct-titles/title_distinct.txt").exists());
}

#[test]
fn test_sample_plan_encodings_resolve() {
    let sample = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/distinct.toml");
    let plan = DistinctPlan::load(&sample).unwrap();

    assert!(plan.jobs.len() >= 2);
    for job in &plan.jobs {
        assert!(
            resolve_encoding(&job.encoding).is_ok(),
            "{} uses unknown encoding {}",
            job.csv_path.display(),
            job.encoding
        );
    }
}
