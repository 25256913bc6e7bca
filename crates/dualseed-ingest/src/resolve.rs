//! Key resolution: `app_user.id` → username
//!
//! The CSV extracts are keyed by username while the relational store assigns
//! numeric ids. Before any document is built, the requested ids are looked up
//! in `app_user`; ids without a row are dropped with a warning.

use crate::error::{IngestError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, warn};

/// Environment variable consulted when no connection string is passed
pub const SQL_DATABASE_URL_ENV: &str = "SQL_DATABASE_URL";

/// Looks up usernames for numeric user ids
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Usernames for whichever of `ids` exist; unknown ids are simply absent
    async fn resolve(&self, ids: &[i64]) -> Result<HashMap<i64, String>>;
}

/// [`KeyResolver`] backed by the PostgreSQL `app_user` table
pub struct PgKeyResolver {
    pool: PgPool,
}

impl PgKeyResolver {
    /// Connect with a single pooled connection; lookups are one query per run
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(connection_string)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyResolver for PgKeyResolver {
    async fn resolve(&self, ids: &[i64]) -> Result<HashMap<i64, String>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id::bigint, username::text FROM app_user WHERE id = ANY($1::bigint[])",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

/// In-memory [`KeyResolver`], for fixtures and offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticKeyResolver {
    users: HashMap<i64, String>,
}

impl StaticKeyResolver {
    pub fn new(users: impl IntoIterator<Item = (i64, impl Into<String>)>) -> Self {
        Self {
            users: users.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve(&self, ids: &[i64]) -> Result<HashMap<i64, String>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}

/// Resolved id → username mapping, iterated in ascending id order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    entries: BTreeMap<i64, String>,
}

impl UserDirectory {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(id, username)` pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Ids in ascending order
    pub fn ids(&self) -> Vec<i64> {
        self.entries.keys().copied().collect()
    }

    /// Usernames to filter the CSV extracts by
    pub fn usernames(&self) -> HashSet<String> {
        self.entries.values().cloned().collect()
    }
}

impl FromIterator<(i64, String)> for UserDirectory {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Resolve `ids` into a directory
///
/// Missing ids are reported and skipped. Resolving none of them is an error.
pub async fn resolve_user_directory(
    resolver: &dyn KeyResolver,
    ids: &[i64],
) -> Result<UserDirectory> {
    let mut requested = ids.to_vec();
    requested.sort_unstable();
    requested.dedup();

    let found = resolver.resolve(&requested).await?;
    let missing: Vec<i64> = requested
        .iter()
        .copied()
        .filter(|id| !found.contains_key(id))
        .collect();

    if !missing.is_empty() {
        warn!(missing = ?missing, "Some user IDs were not found in app_user");
    }

    let directory: UserDirectory = found.into_iter().collect();
    if directory.is_empty() {
        return Err(IngestError::EmptyUserDirectory);
    }

    info!(requested = requested.len(), resolved = directory.len(), "Resolved usernames");
    Ok(directory)
}

/// Explicit connection string, else `SQL_DATABASE_URL`
pub fn resolve_sql_connection_string(explicit: Option<&str>) -> Result<String> {
    if let Some(url) = explicit.filter(|s| !s.trim().is_empty()) {
        return Ok(url.to_string());
    }
    match std::env::var(SQL_DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(IngestError::MissingConnectionString),
    }
}
