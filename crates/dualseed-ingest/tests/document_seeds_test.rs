//! Document seed generation tests against small CSV fixtures

use dualseed_common::ProgressMode;
use dualseed_ingest::documents::{Manifest, RatingDocument, UserDocument};
use dualseed_ingest::{generate_document_seeds, IngestConfig, IngestError, StaticKeyResolver};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

const PROFILES: &str = "\
username,watching,completed,on_hold,dropped,plan_to_watch
alice,2,\"1,050\",1,0,14
mallory,1,1,1,1,1
";

const RATINGS: &str = "\
username,anime_id,status,score,num_watched_episodes
alice,5114,Completed,10,64
mallory,1,Watching,3,1
alice,9253,Plan to Watch,0,0.0
";

const FAVS: &str = "\
username,fav_type,id
alice,anime,5114
mallory,anime,1
alice,studio,4
";

fn write_datasets(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("profiles.csv"), PROFILES).unwrap();
    std::fs::write(dir.join("ratings.csv"), RATINGS).unwrap();
    std::fs::write(dir.join("favs.csv"), FAVS).unwrap();
}

fn config(root: &TempDir) -> IngestConfig {
    let datasets = root.path().join("datasets");
    write_datasets(&datasets);
    IngestConfig::new()
        .with_datasets_dir(&datasets)
        .with_output_dir(root.path().join("document-seeds"))
        .with_progress(ProgressMode::Off)
}

fn read<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_alice_and_bob() {
    let root = TempDir::new().unwrap();
    let config = config(&root);
    let resolver = StaticKeyResolver::new([(1, "alice"), (2, "bob")]);

    let report = generate_document_seeds(&config, &resolver, &[1, 2]).await.unwrap();

    let ratings: Vec<RatingDocument> = read(&report.paths.ratings);
    assert_eq!(ratings.len(), 2);
    assert_eq!(ratings[0].id, 1);
    assert_eq!(ratings[0].user_id, 1);
    assert_eq!(ratings[0].anime_id, 5114);
    assert_eq!(ratings[0].status, "completed");
    assert_eq!(ratings[1].id, 2);
    assert_eq!(ratings[1].user_id, 1);
    assert_eq!(ratings[1].status, "plan_to_watch");

    let users: Vec<UserDocument> = read(&report.paths.users);
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, 1);
    assert_eq!(users[0].ratings, vec![1, 2]);
    assert_eq!(users[0].favorites.anime, vec![5114]);
    assert_eq!(users[0].stats.completed, 1050);
    assert_eq!(users[1].id, 2);
    assert!(users[1].ratings.is_empty());
    assert!(users[1].favorites.is_empty());
    assert_eq!(users[1].stats.plan_to_watch, 0);

    let manifest: Manifest = read(&report.paths.manifest);
    assert_eq!(manifest.users_count, 2);
    assert_eq!(manifest.ratings_count, 2);
    assert_eq!(manifest.user_ids, vec![1, 2]);
    assert_eq!(manifest, report.manifest);
}

#[tokio::test]
async fn test_rating_references_are_consistent() {
    let root = TempDir::new().unwrap();
    let config = config(&root);
    let resolver = StaticKeyResolver::new([(7, "mallory"), (3, "alice")]);

    let report = generate_document_seeds(&config, &resolver, &[7, 3]).await.unwrap();
    let ratings: Vec<RatingDocument> = read(&report.paths.ratings);
    let users: Vec<UserDocument> = read(&report.paths.users);

    let by_id: HashMap<i64, &RatingDocument> = ratings.iter().map(|r| (r.id, r)).collect();
    assert_eq!(by_id.len(), ratings.len(), "rating ids must be unique");

    let mut referenced = 0;
    for user in &users {
        for rating_id in &user.ratings {
            assert_eq!(by_id[rating_id].user_id, user.id);
            referenced += 1;
        }
    }
    assert_eq!(referenced, ratings.len());

    // alice (3) sorts before mallory (7), so she owns ids 1 and 2
    assert_eq!(users[0].id, 3);
    assert_eq!(users[0].ratings, vec![1, 2]);
    assert_eq!(users[1].ratings, vec![3]);
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let root = TempDir::new().unwrap();
    let config = config(&root);
    let resolver = StaticKeyResolver::new([(1, "alice"), (2, "mallory")]);

    let first = generate_document_seeds(&config, &resolver, &[2, 1]).await.unwrap();
    let users_before = std::fs::read(&first.paths.users).unwrap();
    let ratings_before = std::fs::read(&first.paths.ratings).unwrap();

    let second = generate_document_seeds(&config, &resolver, &[1, 2]).await.unwrap();
    assert_eq!(std::fs::read(&second.paths.users).unwrap(), users_before);
    assert_eq!(std::fs::read(&second.paths.ratings).unwrap(), ratings_before);
}

#[tokio::test]
async fn test_unknown_ids_fail_before_writing() {
    let root = TempDir::new().unwrap();
    let config = config(&root);
    let resolver = StaticKeyResolver::new([(1, "alice")]);

    let err = generate_document_seeds(&config, &resolver, &[40, 41])
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::EmptyUserDirectory));
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn test_partial_ids_proceed_with_found_subset() {
    let root = TempDir::new().unwrap();
    let config = config(&root);
    let resolver = StaticKeyResolver::new([(1, "alice")]);

    let report = generate_document_seeds(&config, &resolver, &[1, 99]).await.unwrap();
    assert_eq!(report.manifest.user_ids, vec![1]);
    assert_eq!(report.manifest.ratings_count, 2);
}
