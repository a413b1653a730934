//! Shapes raw stored rows into response records.
//!
//! - `sources` is split from its comma-joined form, or derived from which
//!   platform identity fields are present when nothing is stored
//! - `num_sources` always equals the source list length, floored at 1
//! - an empty poster URL becomes [`PLACEHOLDER_POSTER`]
//! - a missing rating becomes `0.0`
//!
//! Normalizing an already-normalized [`Movie`] is a no-op.

use crate::catalog::lenient::{LenientInt, LenientReal, LenientText};
use crate::catalog::platform::Platform;
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeSet;

pub const PLACEHOLDER_POSTER: &str =
    "https://via.placeholder.com/300x450/667eea/ffffff?text=Poster+not+found";

/// List-view columns as stored.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct MovieSummaryRow {
    pub id: i64,
    pub canonical_key: Option<String>,
    pub title: String,
    #[sqlx(try_from = "LenientInt")]
    pub release_year: Option<i64>,
    #[sqlx(try_from = "LenientReal")]
    pub imdb_rating: Option<f64>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub poster_url: Option<String>,
    pub sources: Option<String>,
    #[sqlx(try_from = "LenientInt")]
    pub num_sources: Option<i64>,
    pub netflix_id: Option<String>,
    pub amazon_id: Option<String>,
    pub imdb_id: Option<String>,
}

/// Per-platform metadata and bookkeeping columns, only returned by detail lookups.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
pub struct Provenance {
    #[sqlx(try_from = "LenientInt")]
    pub imdb_votes: Option<i64>,
    pub language: Option<String>,
    pub netflix_director: Option<String>,
    pub netflix_cast: Option<String>,
    pub netflix_country: Option<String>,
    pub netflix_date_added: Option<String>,
    pub netflix_rating: Option<String>,
    pub netflix_duration: Option<String>,
    pub netflix_listed_in: Option<String>,
    pub amazon_director: Option<String>,
    pub amazon_cast: Option<String>,
    pub amazon_country: Option<String>,
    pub amazon_date_added: Option<String>,
    pub amazon_rating: Option<String>,
    pub amazon_duration: Option<String>,
    pub amazon_listed_in: Option<String>,
    #[sqlx(try_from = "LenientText")]
    pub created_at: Option<String>,
}

/// A full stored row (`SELECT *`).
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct MovieRow {
    #[sqlx(flatten)]
    pub summary: MovieSummaryRow,
    #[sqlx(flatten)]
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: i64,
    pub canonical_key: Option<String>,
    pub title: String,
    pub release_year: Option<i64>,
    pub imdb_rating: f64,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub poster_url: String,
    pub sources: Vec<String>,
    pub num_sources: i64,
    pub netflix_id: Option<String>,
    pub amazon_id: Option<String>,
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(flatten)]
    pub provenance: Provenance,
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn has_real_poster(poster: Option<&str>) -> bool {
    present(poster) && poster != Some(PLACEHOLDER_POSTER)
}

/// Split a comma-joined list, trimming and dropping empty pieces.
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn derive_sources(netflix_id: Option<&str>, amazon_id: Option<&str>, poster: Option<&str>) -> Vec<String> {
    Platform::ALL
        .into_iter()
        .filter(|p| match p {
            Platform::Netflix => present(netflix_id),
            Platform::Amazon => present(amazon_id),
            Platform::Imdb => has_real_poster(poster),
        })
        .map(|p| p.tag().to_string())
        .collect()
}

fn source_count(sources: &[String]) -> i64 {
    i64::try_from(sources.len()).unwrap_or(i64::MAX).max(1)
}

fn poster_or_placeholder(poster: Option<String>) -> String {
    match poster {
        Some(url) if !url.trim().is_empty() => url,
        _ => PLACEHOLDER_POSTER.to_string(),
    }
}

impl MovieSummaryRow {
    pub fn normalize(self) -> Movie {
        let stored: Vec<String> = self
            .sources
            .as_deref()
            .map(|raw| split_list(raw).map(str::to_string).collect())
            .unwrap_or_default();
        let sources = if stored.is_empty() {
            derive_sources(
                self.netflix_id.as_deref(),
                self.amazon_id.as_deref(),
                self.poster_url.as_deref(),
            )
        } else {
            stored
        };

        Movie {
            id: self.id,
            canonical_key: self.canonical_key,
            title: self.title,
            release_year: self.release_year,
            imdb_rating: self.imdb_rating.unwrap_or(0.0),
            genre: self.genre,
            description: self.description,
            poster_url: poster_or_placeholder(self.poster_url),
            num_sources: source_count(&sources),
            sources,
            netflix_id: self.netflix_id,
            amazon_id: self.amazon_id,
            imdb_id: self.imdb_id,
        }
    }
}

impl Movie {
    /// Re-apply the normalization rules to an already shaped record.
    pub fn normalize(mut self) -> Movie {
        if self.sources.is_empty() {
            self.sources = derive_sources(
                self.netflix_id.as_deref(),
                self.amazon_id.as_deref(),
                Some(self.poster_url.as_str()),
            );
        }
        self.num_sources = source_count(&self.sources);
        self.poster_url = poster_or_placeholder(Some(self.poster_url));
        self
    }
}

impl MovieRow {
    pub fn normalize(self) -> MovieDetail {
        MovieDetail {
            movie: self.summary.normalize(),
            provenance: self.provenance,
        }
    }
}

/// Union of every comma-separated genre, trimmed, deduplicated and sorted.
pub fn collect_genres<'a, I>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let set: BTreeSet<&str> = fields.into_iter().flat_map(split_list).collect();
    set.into_iter().map(str::to_string).collect()
}
