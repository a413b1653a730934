use super::{LoadReport, SourceFormat};
use crate::catalog::lenient::{parse_float, parse_int};
use crate::error::{CatalogError, Result};
use crate::util::db::MOVIE_COLUMNS;
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Deserializer};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::path::Path;
use tracing::{info, warn};

/// Rows per multi-row INSERT (28 binds each, well under SQLite's variable limit).
const INSERT_BATCH: usize = 500;

/// One movie as read from a tabular export. Columns are matched by header
/// name; unknown columns (including `id` and `created_at`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovieInput {
    pub canonical_key: Option<String>,
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub release_year: Option<i64>,
    #[serde(deserialize_with = "lenient_float")]
    pub imdb_rating: Option<f64>,
    #[serde(deserialize_with = "lenient_int")]
    pub imdb_votes: Option<i64>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub poster_url: Option<String>,
    pub language: Option<String>,
    pub imdb_id: Option<String>,
    pub sources: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub num_sources: Option<i64>,
    pub netflix_id: Option<String>,
    pub netflix_director: Option<String>,
    pub netflix_cast: Option<String>,
    pub netflix_country: Option<String>,
    pub netflix_date_added: Option<String>,
    pub netflix_rating: Option<String>,
    pub netflix_duration: Option<String>,
    pub netflix_listed_in: Option<String>,
    pub amazon_id: Option<String>,
    pub amazon_director: Option<String>,
    pub amazon_cast: Option<String>,
    pub amazon_country: Option<String>,
    pub amazon_date_added: Option<String>,
    pub amazon_rating: Option<String>,
    pub amazon_duration: Option<String>,
    pub amazon_listed_in: Option<String>,
}

impl MovieInput {
    fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<i64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_int))
}

fn lenient_float<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_float))
}

#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub movies: Vec<MovieInput>,
    /// Malformed rows and rows without a title.
    pub skipped: u64,
}

/// Parse a CSV export (UTF-8, optional BOM, header row required).
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedCsv> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(bytes);

    if !rdr.headers()?.iter().any(|h| h == "title") {
        return Err(CatalogError::Ingestion(
            "CSV header has no `title` column".to_string(),
        ));
    }

    let mut parsed = ParsedCsv::default();
    for (idx, record) in rdr.deserialize::<MovieInput>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let line = idx + 2;
        match record {
            Ok(movie) if movie.has_title() => parsed.movies.push(movie),
            Ok(_) => {
                parsed.skipped += 1;
                warn!(line, "skipping CSV row without a title");
            }
            Err(e) => {
                parsed.skipped += 1;
                warn!(line, error = %e, "skipping malformed CSV row");
            }
        }
    }
    Ok(parsed)
}

/// Insert rows in batches. Rows violating a constraint (duplicate
/// `canonical_key`) are ignored by the store; returns the rows written.
pub async fn insert_movies(conn: &mut SqliteConnection, movies: &[MovieInput]) -> Result<u64> {
    let mut inserted = 0u64;
    for chunk in movies.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "INSERT OR IGNORE INTO movies ({}) ",
            MOVIE_COLUMNS.join(", ")
        ));
        qb.push_values(chunk, |mut b, m| {
            b.push_bind(&m.canonical_key)
                .push_bind(&m.title)
                .push_bind(m.release_year)
                .push_bind(m.imdb_rating)
                .push_bind(m.imdb_votes)
                .push_bind(&m.genre)
                .push_bind(&m.description)
                .push_bind(m.poster_url.clone().unwrap_or_default())
                .push_bind(&m.language)
                .push_bind(&m.imdb_id)
                .push_bind(&m.sources)
                .push_bind(m.num_sources)
                .push_bind(&m.netflix_id)
                .push_bind(&m.netflix_director)
                .push_bind(&m.netflix_cast)
                .push_bind(&m.netflix_country)
                .push_bind(&m.netflix_date_added)
                .push_bind(&m.netflix_rating)
                .push_bind(&m.netflix_duration)
                .push_bind(&m.netflix_listed_in)
                .push_bind(&m.amazon_id)
                .push_bind(&m.amazon_director)
                .push_bind(&m.amazon_cast)
                .push_bind(&m.amazon_country)
                .push_bind(&m.amazon_date_added)
                .push_bind(&m.amazon_rating)
                .push_bind(&m.amazon_duration)
                .push_bind(&m.amazon_listed_in);
        });
        let done = qb.build().execute(&mut *conn).await?;
        inserted += done.rows_affected();
    }
    Ok(inserted)
}

pub async fn load(conn: &mut SqliteConnection, path: &Path) -> Result<LoadReport> {
    let bytes = tokio::fs::read(path).await?;
    let parsed = tokio::task::spawn_blocking(move || parse_csv(&bytes))
        .await
        .map_err(|e| CatalogError::Ingestion(format!("CSV parser task failed: {e}")))??;

    let inserted = insert_movies(conn, &parsed.movies).await?;
    let rejected = parsed.movies.len() as u64 - inserted;
    if rejected > 0 {
        warn!(rejected, "rows rejected by the store (duplicate canonical_key)");
    }

    let mut report = LoadReport::new(path, SourceFormat::Csv);
    report.loaded = inserted;
    report.skipped = parsed.skipped + rejected;
    info!(
        path = %path.display(),
        rows = report.loaded,
        skipped = report.skipped,
        "csv loaded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}canonical_key,title,release_year,imdb_rating,genre,poster_url,netflix_id,extra_column\n\
        heat-1995,Heat,1995.0,8.3,\"Crime, Drama\",https://img/heat.jpg,s1,x\n\
        untitled,,2001,5.0,Drama,,,x\n\
        se7en-1995,Se7en,1995,n/a,\"Crime, Mystery\",,,x\n";

    #[test]
    fn parses_rows_by_header_name() {
        let parsed = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.movies.len(), 2);

        let heat = &parsed.movies[0];
        assert_eq!(heat.canonical_key.as_deref(), Some("heat-1995"));
        assert_eq!(heat.release_year, Some(1995));
        assert_eq!(heat.imdb_rating, Some(8.3));
        assert_eq!(heat.genre.as_deref(), Some("Crime, Drama"));
        assert_eq!(heat.netflix_id.as_deref(), Some("s1"));

        let se7en = &parsed.movies[1];
        assert_eq!(se7en.imdb_rating, None);
        assert_eq!(se7en.poster_url, None);
    }

    #[test]
    fn rejects_files_without_title_column() {
        let err = parse_csv(b"name,year\nHeat,1995\n").unwrap_err();
        assert!(matches!(err, CatalogError::Ingestion(_)));
    }

    #[tokio::test]
    async fn duplicates_are_ignored_not_fatal() {
        let db = crate::testing::memory_db().await;
        let movies = vec![
            MovieInput {
                canonical_key: Some("k".into()),
                title: Some("First".into()),
                ..MovieInput::default()
            },
            MovieInput {
                canonical_key: Some("k".into()),
                title: Some("Second".into()),
                ..MovieInput::default()
            },
            MovieInput {
                canonical_key: Some("j".into()),
                title: Some("Third".into()),
                ..MovieInput::default()
            },
        ];
        let mut conn = db.pool.acquire().await.unwrap();
        assert_eq!(insert_movies(&mut conn, &movies).await.unwrap(), 2);
        drop(conn);

        let poster: String = sqlx::query_scalar("SELECT poster_url FROM movies WHERE canonical_key = 'j'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(poster, "");
    }
}
