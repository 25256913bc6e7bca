//! Command-line validation tests for `dualseed-ingest`

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ingest(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dualseed-ingest").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SQL_DATABASE_URL")
        .env("LOG_LEVEL", "error");
    cmd
}

#[test]
fn test_distinct_without_columns_exits_2() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();

    ingest(&dir)
        .args(["distinct", "--csv-path", "a.csv", "--columns", " , ", "--output-path", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No columns provided."));
}

#[test]
fn test_distinct_writes_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.csv"), "tags\n\"['x', 'y']\"\nx\n").unwrap();

    ingest(&dir)
        .args(["distinct", "--csv-path", "a.csv", "--columns", "tags", "--output-path", "out"])
        .args(["--progress", "off"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("out/tags_distinct.txt")).unwrap();
    assert_eq!(written, "x\ny\n");
}

#[test]
fn test_distinct_missing_column_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.csv"), "tags\nx\n").unwrap();

    ingest(&dir)
        .args(["distinct", "--csv-path", "a.csv", "--columns", "genres,tags", "--output-path", "out"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("genres"));

    assert!(dir.path().join("out/tags_distinct.txt").exists());
}

#[test]
fn test_documents_rejects_invalid_ids() {
    let dir = TempDir::new().unwrap();
    ingest(&dir)
        .args(["documents", "--user-ids", "1,abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid user IDs"));
}

#[test]
fn test_documents_requires_connection_string() {
    let dir = TempDir::new().unwrap();
    ingest(&dir)
        .args(["documents", "--user-ids", "1,2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SQL_DATABASE_URL"));
}

#[test]
fn test_documents_requires_an_id_source() {
    let dir = TempDir::new().unwrap();
    ingest(&dir).args(["documents"]).assert().failure();
}

#[test]
fn test_documents_reports_malformed_env_local() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".env.local"),
        "SQL_DATABASE_URL postgres://localhost/anime\n",
    )
    .unwrap();

    ingest(&dir)
        .args(["documents", "--user-ids", "1,2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load .env.local"))
        .stderr(predicate::str::contains("Missing PostgreSQL").not());
}

#[test]
fn test_bad_log_level_warns_and_continues() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.csv"), "tags\nx\n").unwrap();

    ingest(&dir)
        .env("LOG_LEVEL", "loud")
        .args(["distinct", "--csv-path", "a.csv", "--columns", "tags", "--output-path", "out"])
        .args(["--progress", "off"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: ignoring logging overrides"))
        .stderr(predicate::str::contains("LOG_LEVEL=loud"));
}
