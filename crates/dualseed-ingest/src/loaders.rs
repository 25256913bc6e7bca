//! Username-keyed CSV loaders
//!
//! Three independent streaming passes over the profile, rating and favorite
//! extracts. Each keeps only rows whose `username` is in the requested set;
//! everything else is skipped without error. Numeric cells go through
//! [`parse_lenient_int`](crate::tabular::parse_lenient_int).

use crate::error::{IngestError, Result};
use crate::tabular::{self, field, normalize_status, parse_lenient_int, Header};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Per-user list status counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub watching: i64,
    pub completed: i64,
    pub on_hold: i64,
    pub dropped: i64,
    pub plan_to_watch: i64,
}

/// One rating row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub anime_id: i64,
    pub status: String,
    pub score: i64,
    pub num_watched_episodes: i64,
}

/// Favorited ids grouped by category, in row order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSet {
    pub anime: Vec<i64>,
    pub characters: Vec<i64>,
    pub people: Vec<i64>,
}

/// Favorite category tag as written in the extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteKind {
    Anime,
    Character,
    Person,
}

impl FavoriteKind {
    /// Recognized tags; anything else is dropped
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "anime" => Some(Self::Anime),
            "character" => Some(Self::Character),
            "people" | "person" => Some(Self::Person),
            _ => None,
        }
    }
}

impl FavoriteSet {
    /// Append `id` to its category. Duplicates are kept.
    pub fn push(&mut self, kind: FavoriteKind, id: i64) {
        match kind {
            FavoriteKind::Anime => self.anime.push(id),
            FavoriteKind::Character => self.characters.push(id),
            FavoriteKind::Person => self.people.push(id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anime.is_empty() && self.characters.is_empty() && self.people.is_empty()
    }
}

/// Column layout shared by the three passes
struct KeyedPass<'a> {
    path: &'a Path,
    usernames: &'a HashSet<String>,
    label: &'a str,
    show_progress: bool,
}

impl KeyedPass<'_> {
    /// Stream the source, handing matching rows and the header to `on_row`
    fn run(
        &self,
        mut on_row: impl FnMut(&Header, &csv::StringRecord, &str),
    ) -> Result<u64> {
        let mut reader = tabular::open_utf8_csv(self.path)?;
        let header = Header::read(&mut reader, self.path)?;
        let username_idx = header.position("username");
        let pb = tabular::row_progress(self.path, self.label, self.show_progress)?;

        let mut matched = 0u64;
        for record in reader.records() {
            let record = record.map_err(|e| IngestError::csv(self.path, e))?;
            pb.inc(1);

            let username = field(&record, username_idx);
            if self.usernames.contains(username) {
                matched += 1;
                on_row(&header, &record, username);
            }
        }
        pb.finish_and_clear();

        debug!(source = %self.path.display(), matched, "{}", self.label);
        Ok(matched)
    }
}

/// Load per-user status counts; the last matching row for a user wins
pub fn load_profiles(
    path: &Path,
    usernames: &HashSet<String>,
    show_progress: bool,
) -> Result<HashMap<String, ProfileStats>> {
    let mut profiles = HashMap::new();
    let pass = KeyedPass {
        path,
        usernames,
        label: "Loading profiles",
        show_progress,
    };

    pass.run(|header, record, username| {
        let int = |column: &str| parse_lenient_int(field(record, header.position(column)));
        profiles.insert(
            username.to_string(),
            ProfileStats {
                watching: int("watching"),
                completed: int("completed"),
                on_hold: int("on_hold"),
                dropped: int("dropped"),
                plan_to_watch: int("plan_to_watch"),
            },
        );
    })?;

    info!(profiles = profiles.len(), "Loaded profiles");
    Ok(profiles)
}

/// Load per-user rating rows in input order
pub fn load_ratings(
    path: &Path,
    usernames: &HashSet<String>,
    show_progress: bool,
) -> Result<HashMap<String, Vec<RatingEvent>>> {
    let mut ratings: HashMap<String, Vec<RatingEvent>> = HashMap::new();
    let pass = KeyedPass {
        path,
        usernames,
        label: "Loading ratings",
        show_progress,
    };

    let rows = pass.run(|header, record, username| {
        let text = |column: &str| field(record, header.position(column));
        ratings
            .entry(username.to_string())
            .or_default()
            .push(RatingEvent {
                anime_id: parse_lenient_int(text("anime_id")),
                status: normalize_status(text("status")),
                score: parse_lenient_int(text("score")),
                num_watched_episodes: parse_lenient_int(text("num_watched_episodes")),
            });
    })?;

    info!(users = ratings.len(), rows, "Loaded ratings");
    Ok(ratings)
}

/// Load per-user favorites, dropping unknown tags and non-positive ids
pub fn load_favorites(
    path: &Path,
    usernames: &HashSet<String>,
    show_progress: bool,
) -> Result<HashMap<String, FavoriteSet>> {
    let mut favorites: HashMap<String, FavoriteSet> = HashMap::new();
    let pass = KeyedPass {
        path,
        usernames,
        label: "Loading favorites",
        show_progress,
    };

    pass.run(|header, record, username| {
        let fav_id = parse_lenient_int(field(record, header.position("id")));
        if fav_id <= 0 {
            return;
        }
        if let Some(kind) = FavoriteKind::from_tag(field(record, header.position("fav_type"))) {
            favorites
                .entry(username.to_string())
                .or_default()
                .push(kind, fav_id);
        }
    })?;

    info!(users = favorites.len(), "Loaded favorites");
    Ok(favorites)
}
