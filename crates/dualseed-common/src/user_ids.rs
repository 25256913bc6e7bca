//! User identifier lists
//!
//! The orchestrator hands the document generator a plain-text file of
//! `app_user` ids. Both sides agree on this format: integers separated by
//! commas, newlines or carriage returns, with blank entries ignored.

use crate::error::{Result, SeedError};
use std::path::Path;

/// Parse a comma-separated list of user ids
///
/// Order and duplicates are preserved; callers that need a set sort and
/// dedup themselves.
pub fn parse_user_ids(raw: &str) -> Result<Vec<i64>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>().map_err(|_| {
                SeedError::invalid_user_ids(format!(
                    "'{item}' is not an integer. Must be comma-separated integers."
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(SeedError::invalid_user_ids("No valid user IDs provided."));
    }
    Ok(ids)
}

/// Read and parse a user id file (comma or newline separated)
pub fn parse_user_ids_file(path: impl AsRef<Path>) -> Result<Vec<i64>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(SeedError::invalid_user_ids(format!(
            "User IDs file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let content = content.trim();
    if content.is_empty() {
        return Err(SeedError::invalid_user_ids(format!(
            "User IDs file is empty: {}",
            path.display()
        )));
    }

    parse_user_ids(&content.replace(['\n', '\r'], ","))
}

/// Render ids in the on-disk form read by [`parse_user_ids_file`]
pub fn format_user_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Write ids to `path`, creating parent directories as needed
pub fn write_user_ids_file(path: impl AsRef<Path>, ids: &[i64]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{}\n", format_user_ids(ids)))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_user_ids() {
        assert_eq!(parse_user_ids("14, 20,33").unwrap(), vec![14, 20, 33]);
        assert_eq!(parse_user_ids("5,,5,").unwrap(), vec![5, 5]);
    }

    #[test]
    fn test_parse_user_ids_rejects_garbage() {
        assert!(matches!(
            parse_user_ids("1,two,3"),
            Err(SeedError::InvalidUserIds(_))
        ));
        assert!(matches!(parse_user_ids(" , "), Err(SeedError::InvalidUserIds(_))));
    }

    #[test]
    fn test_parse_user_ids_file_mixed_separators() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "1,2\r\n3\n\n4,\n").unwrap();

        assert_eq!(parse_user_ids_file(&path).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_user_ids_file_missing_or_empty() {
        let dir = TempDir::new().unwrap();
        assert!(parse_user_ids_file(dir.path().join("absent.txt")).is_err());

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "  \n").unwrap();
        let err = parse_user_ids_file(&empty).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("user_ids.txt");
        write_user_ids_file(&path, &[3, 7, 11]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3,7,11\n");
        assert_eq!(parse_user_ids_file(&path).unwrap(), vec![3, 7, 11]);
    }
}
