//! Document seed construction
//!
//! Turns the username-keyed loader output into two document collections keyed
//! by numeric ids:
//!
//! - `ratings.json`: one document per rating row with a synthetic id
//! - `users.json`: one document per user, embedding stats and favorites and
//!   referencing its ratings by id
//!
//! Rating ids start at 1 and are handed out over users in ascending id order,
//! then rows in input order. Downstream loaders key on this assignment, so it
//! must not depend on hash-map iteration order.

use crate::error::{IngestError, Result};
use crate::loaders::{FavoriteSet, ProfileStats, RatingEvent};
use crate::resolve::UserDirectory;
use crate::tabular::counter_progress;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// A rating in the `ratings` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDocument {
    pub id: i64,
    pub user_id: i64,
    pub anime_id: i64,
    pub status: String,
    pub score: i64,
    pub num_watched_episodes: i64,
}

/// A user in the `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: i64,
    pub stats: ProfileStats,
    /// Ids of this user's [`RatingDocument`]s
    pub ratings: Vec<i64>,
    pub favorites: FavoriteSet,
}

/// Summary written next to the document files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub users_file: String,
    pub ratings_file: String,
    pub users_count: usize,
    pub ratings_count: usize,
    pub user_ids: Vec<i64>,
}

/// Rating ids grouped by owning user id
pub type RatingIndex = HashMap<i64, Vec<i64>>;

fn progress(total: usize, message: &str, show: bool) -> ProgressBar {
    if show {
        counter_progress(total as u64, message, "user")
    } else {
        ProgressBar::hidden()
    }
}

/// Build rating documents and the per-user id index
pub fn build_rating_documents(
    directory: &UserDirectory,
    ratings: &HashMap<String, Vec<RatingEvent>>,
    show_progress: bool,
) -> (RatingIndex, Vec<RatingDocument>) {
    let pb = progress(directory.len(), "Building rating documents", show_progress);
    let mut documents = Vec::new();
    let mut index: RatingIndex = HashMap::new();
    let mut next_id = 1i64;

    for (user_id, username) in directory.iter() {
        for event in ratings.get(username).into_iter().flatten() {
            documents.push(RatingDocument {
                id: next_id,
                user_id,
                anime_id: event.anime_id,
                status: event.status.clone(),
                score: event.score,
                num_watched_episodes: event.num_watched_episodes,
            });
            index.entry(user_id).or_default().push(next_id);
            next_id += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    (index, documents)
}

/// Build one user document per directory entry, filling defaults
pub fn build_user_documents(
    directory: &UserDirectory,
    profiles: &HashMap<String, ProfileStats>,
    rating_index: &RatingIndex,
    favorites: &HashMap<String, FavoriteSet>,
    show_progress: bool,
) -> Vec<UserDocument> {
    let pb = progress(directory.len(), "Building user documents", show_progress);
    let documents = directory
        .iter()
        .map(|(user_id, username)| {
            pb.inc(1);
            UserDocument {
                id: user_id,
                stats: profiles.get(username).copied().unwrap_or_default(),
                ratings: rating_index.get(&user_id).cloned().unwrap_or_default(),
                favorites: favorites.get(username).cloned().unwrap_or_default(),
            }
        })
        .collect();
    pb.finish_and_clear();
    documents
}

/// Paths of the three generated artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSeedPaths {
    pub users: PathBuf,
    pub ratings: PathBuf,
    pub manifest: PathBuf,
}

impl DocumentSeedPaths {
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            users: output_dir.join("users.json"),
            ratings: output_dir.join("ratings.json"),
            manifest: output_dir.join("manifest.json"),
        }
    }
}

/// Write `users.json`, `ratings.json` and `manifest.json` under `output_dir`
pub fn write_document_seeds(
    output_dir: &Path,
    users: &[UserDocument],
    ratings: &[RatingDocument],
) -> Result<(DocumentSeedPaths, Manifest)> {
    let paths = DocumentSeedPaths::in_dir(output_dir);

    let mut user_ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    user_ids.sort_unstable();

    let manifest = Manifest {
        users_file: paths.users.display().to_string(),
        ratings_file: paths.ratings.display().to_string(),
        users_count: users.len(),
        ratings_count: ratings.len(),
        user_ids,
    };

    write_json(&paths.users, &users)?;
    write_json(&paths.ratings, &ratings)?;
    write_json(&paths.manifest, &manifest)?;

    info!(
        users = manifest.users_count,
        ratings = manifest.ratings_count,
        dir = %output_dir.display(),
        "Wrote document seeds"
    );
    Ok((paths, manifest))
}

/// Pretty-printed JSON with a two-space indent; parent directories are created
pub fn write_json<T: Serialize + ?Sized>(path: &Path, payload: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| IngestError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| IngestError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, payload)?;
    writer.flush().map_err(|e| IngestError::io(path, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn event(anime_id: i64) -> RatingEvent {
        RatingEvent {
            anime_id,
            status: "completed".to_string(),
            score: 7,
            num_watched_episodes: 12,
        }
    }

    fn directory(entries: &[(i64, &str)]) -> UserDirectory {
        entries.iter().map(|(id, name)| (*id, name.to_string())).collect()
    }

    #[test]
    fn test_rating_ids_follow_user_then_row_order() {
        let dir = directory(&[(30, "carol"), (4, "alice"), (12, "bob")]);
        let ratings = HashMap::from([
            ("carol".to_string(), vec![event(300)]),
            ("alice".to_string(), vec![event(100), event(101)]),
            ("bob".to_string(), vec![event(200)]),
        ]);

        let (index, docs) = build_rating_documents(&dir, &ratings, false);

        let assigned: Vec<(i64, i64, i64)> =
            docs.iter().map(|d| (d.id, d.user_id, d.anime_id)).collect();
        assert_eq!(
            assigned,
            vec![(1, 4, 100), (2, 4, 101), (3, 12, 200), (4, 30, 300)]
        );
        assert_eq!(index[&4], vec![1, 2]);
        assert_eq!(index[&30], vec![4]);
    }

    #[test]
    fn test_user_documents_default_fill() {
        let dir = directory(&[(1, "alice"), (2, "ghost")]);
        let profiles = HashMap::from([(
            "alice".to_string(),
            ProfileStats {
                watching: 1,
                ..ProfileStats::default()
            },
        )]);
        let index = HashMap::from([(1, vec![1, 2])]);

        let users = build_user_documents(&dir, &profiles, &index, &HashMap::new(), false);

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].stats.watching, 1);
        assert_eq!(users[0].ratings, vec![1, 2]);
        assert_eq!(users[1].id, 2);
        assert_eq!(users[1].stats, ProfileStats::default());
        assert!(users[1].ratings.is_empty());
        assert!(users[1].favorites.is_empty());
    }

    #[test]
    fn test_user_document_json_shape() {
        let doc = UserDocument {
            id: 2,
            stats: ProfileStats::default(),
            ratings: vec![],
            favorites: FavoriteSet::default(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 2,
                "stats": {"watching": 0, "completed": 0, "on_hold": 0, "dropped": 0, "plan_to_watch": 0},
                "ratings": [],
                "favorites": {"anime": [], "characters": [], "people": []}
            })
        );
    }
}
