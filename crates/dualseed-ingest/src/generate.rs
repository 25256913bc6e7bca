//! End-to-end document seed generation
//!
//! Resolve ids → load the three extracts → build documents → write artifacts.
//! Everything that can fail on input is checked before the first file is
//! written; once writing starts, earlier artifacts are left in place on error.

use crate::config::IngestConfig;
use crate::documents::{
    build_rating_documents, build_user_documents, write_document_seeds, DocumentSeedPaths, Manifest,
};
use crate::error::Result;
use crate::loaders::{load_favorites, load_profiles, load_ratings};
use crate::resolve::{resolve_user_directory, KeyResolver};
use tracing::{info, info_span, Instrument};

/// Outcome of a generation run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub paths: DocumentSeedPaths,
    pub manifest: Manifest,
}

/// Generate document seeds for `user_ids`
pub async fn generate_document_seeds(
    config: &IngestConfig,
    resolver: &dyn KeyResolver,
    user_ids: &[i64],
) -> Result<GenerationReport> {
    let span = info_span!("generate_document_seeds", requested = user_ids.len());
    async move {
        let show = config.progress.should_show();
        let directory = resolve_user_directory(resolver, user_ids).await?;
        let usernames = directory.usernames();

        let profiles = load_profiles(&config.datasets.profiles, &usernames, show)?;
        let ratings = load_ratings(&config.datasets.ratings, &usernames, show)?;
        let favorites = load_favorites(&config.datasets.favorites, &usernames, show)?;

        let (rating_index, rating_docs) = build_rating_documents(&directory, &ratings, show);
        let user_docs =
            build_user_documents(&directory, &profiles, &rating_index, &favorites, show);

        let (paths, manifest) = write_document_seeds(&config.output_dir, &user_docs, &rating_docs)?;
        info!(
            users = manifest.users_count,
            ratings = manifest.ratings_count,
            "Document seed generation complete"
        );
        Ok(GenerationReport { paths, manifest })
    }
    .instrument(span)
    .await
}
