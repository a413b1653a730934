use crate::catalog::lenient::{LenientInt, LenientReal};
use crate::catalog::normalize::{collect_genres, Movie, MovieDetail, MovieRow, MovieSummaryRow};
use crate::catalog::platform::Platform;
use crate::catalog::query::{like_pattern, MovieQuery, SqlParam};
use crate::error::{CatalogError, Result};
use crate::util::db::Db;
use serde::Serialize;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::{FromRow, Row};
use tracing::{debug, instrument};

/// Suggestions are only looked up for queries at least this long.
pub const MIN_SUGGESTION_LEN: usize = 2;
pub const MAX_SUGGESTIONS: i64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Suggestion {
    pub id: i64,
    pub title: String,
    #[sqlx(try_from = "LenientInt")]
    pub release_year: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformCounts {
    pub netflix: i64,
    pub amazon: i64,
    pub imdb: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_movies: i64,
    pub year_range: YearRange,
    pub average_rating: f64,
    pub platforms: PlatformCounts,
}

fn bind_as<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &[SqlParam],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            SqlParam::Text(s) => query.bind(s.clone()),
            SqlParam::Int(i) => query.bind(*i),
            SqlParam::Real(f) => query.bind(*f),
        };
    }
    query
}

fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &[SqlParam],
) -> QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            SqlParam::Text(s) => query.bind(s.clone()),
            SqlParam::Int(i) => query.bind(*i),
            SqlParam::Real(f) => query.bind(*f),
        };
    }
    query
}

/// Filtered, sorted page of movies plus the total matching count.
///
/// Count and fetch run inside one read transaction so they observe the same
/// snapshot even while a bulk replace commits.
#[instrument(skip(db, query))]
pub async fn list_movies(db: &Db, query: &MovieQuery) -> Result<MoviePage> {
    let built = query.build();
    debug!(sql = %built.count.sql, params = ?built.count.params, "count query");
    debug!(sql = %built.fetch.sql, params = ?built.fetch.params, "fetch query");

    let mut tx = db.pool.begin().await?;
    let total: i64 = bind_scalar(sqlx::query_scalar(&built.count.sql), &built.count.params)
        .fetch_one(&mut *tx)
        .await?;
    let rows: Vec<MovieSummaryRow> =
        bind_as(sqlx::query_as(&built.fetch.sql), &built.fetch.params)
            .fetch_all(&mut *tx)
            .await?;
    tx.commit().await?;

    let pagination = query.pagination;
    Ok(MoviePage {
        movies: rows.into_iter().map(MovieSummaryRow::normalize).collect(),
        total,
        page: pagination.page(),
        per_page: pagination.per_page(),
        total_pages: pagination.total_pages(total),
    })
}

#[instrument(skip(db))]
pub async fn get_movie(db: &Db, id: i64) -> Result<MovieDetail> {
    let row: Option<MovieRow> = sqlx::query_as("SELECT * FROM movies WHERE id = ?")
        .bind(id)
        .fetch_optional(&db.pool)
        .await?;
    row.map(MovieRow::normalize)
        .ok_or_else(|| CatalogError::not_found(format!("movie {id} not found")))
}

#[instrument(skip(db))]
pub async fn list_genres(db: &Db) -> Result<Vec<String>> {
    let fields: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT genre FROM movies WHERE genre IS NOT NULL AND genre != ''",
    )
    .fetch_all(&db.pool)
    .await?;
    Ok(collect_genres(fields.iter().map(String::as_str)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[instrument(skip(db))]
pub async fn stats(db: &Db) -> Result<CatalogStats> {
    let mut tx = db.pool.begin().await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
        .fetch_one(&mut *tx)
        .await?;

    let ranges = sqlx::query(
        "SELECT MIN(release_year) AS min_year, MAX(release_year) AS max_year, \
         AVG(imdb_rating) AS avg_rating \
         FROM movies \
         WHERE typeof(release_year) IN ('integer', 'real') \
         AND typeof(imdb_rating) IN ('integer', 'real')",
    )
    .fetch_one(&mut *tx)
    .await?;

    let platform_sql = format!(
        "SELECT \
         COALESCE(SUM(CASE WHEN {} THEN 1 ELSE 0 END), 0) AS netflix_count, \
         COALESCE(SUM(CASE WHEN {} THEN 1 ELSE 0 END), 0) AS amazon_count, \
         COALESCE(SUM(CASE WHEN {} THEN 1 ELSE 0 END), 0) AS imdb_count \
         FROM movies",
        Platform::Netflix.presence_sql(),
        Platform::Amazon.presence_sql(),
        Platform::Imdb.presence_sql(),
    );
    let platforms = sqlx::query(&platform_sql).fetch_one(&mut *tx).await?;
    tx.commit().await?;

    let avg: LenientReal = ranges.try_get("avg_rating")?;
    let min: LenientInt = ranges.try_get("min_year")?;
    let max: LenientInt = ranges.try_get("max_year")?;
    Ok(CatalogStats {
        total_movies: total,
        year_range: YearRange {
            min: min.0,
            max: max.0,
        },
        average_rating: round2(avg.0.unwrap_or(0.0)),
        platforms: PlatformCounts {
            netflix: platforms.try_get("netflix_count")?,
            amazon: platforms.try_get("amazon_count")?,
            imdb: platforms.try_get("imdb_count")?,
        },
    })
}

/// Trimmed suggestion needle, or `None` when too short to look up.
///
/// Case is left to `LIKE`, which folds ASCII only.
pub fn suggestion_needle(q: &str) -> Option<String> {
    let needle = q.trim().to_string();
    (needle.chars().count() >= MIN_SUGGESTION_LEN).then_some(needle)
}

/// Up to [`MAX_SUGGESTIONS`] title matches, best rated first. Short queries
/// return an empty list without touching the store.
#[instrument(skip(db))]
pub async fn suggestions(db: &Db, q: &str) -> Result<Vec<Suggestion>> {
    let Some(needle) = suggestion_needle(q) else {
        return Ok(Vec::new());
    };
    let rows = sqlx::query_as(
        "SELECT id, title, release_year FROM movies \
         WHERE title LIKE ? ESCAPE '\\' \
         ORDER BY imdb_rating DESC, id ASC LIMIT ?",
    )
    .bind(like_pattern(&needle))
    .bind(MAX_SUGGESTIONS)
    .fetch_all(&db.pool)
    .await?;
    Ok(rows)
}

/// Every stored row, unnormalized, in id order.
pub async fn all_rows(db: &Db) -> Result<Vec<MovieRow>> {
    let rows = sqlx::query_as("SELECT * FROM movies ORDER BY id")
        .fetch_all(&db.pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::query::{MovieFilter, Pagination, Sort};
    use crate::testing::{memory_db, seed, SeedMovie};

    async fn catalog() -> Db {
        let db = memory_db().await;
        seed(
            &db,
            &[
                SeedMovie::new("k1", "Alien", 1979, Some(8.5), "Horror, Sci-Fi")
                    .netflix("n1"),
                SeedMovie::new("k2", "Brazil", 1985, Some(7.9), "Comedy, Drama").amazon("a2"),
                SeedMovie::new("k3", "Casablanca", 1942, Some(8.5), "Drama, Romance")
                    .poster(""),
                SeedMovie::new("k4", "Drive", 2011, None, "Crime, Drama").poster(""),
                SeedMovie::new("k5", "Amelie", 2001, Some(8.3), "Comedy, Romance")
                    .netflix("n5")
                    .amazon("a5")
                    .sources("netflix,amazon,imdb"),
            ],
        )
        .await;
        db
    }

    fn query(filter: MovieFilter, sort: Sort, page: u32, per_page: u32) -> MovieQuery {
        MovieQuery {
            filter,
            sort,
            pagination: Pagination::new(page, per_page).unwrap(),
        }
    }

    async fn direct_count(db: &Db, predicate: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM movies WHERE {predicate}"))
            .fetch_one(&db.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn min_rating_sorted_by_title() {
        let db = catalog().await;
        let q = query(
            MovieFilter {
                min_rating: Some(8.0),
                ..MovieFilter::default()
            },
            Sort::from_params(Some("title"), Some("ASC")),
            1,
            5,
        );
        let page = list_movies(&db, &q).await.unwrap();
        assert!(page.movies.len() <= 5);
        assert_eq!(page.total, 3);
        assert!(page.movies.iter().all(|m| m.imdb_rating >= 8.0));
        let titles: Vec<&str> = page.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "Amelie", "Casablanca"]);
    }

    #[tokio::test]
    async fn totals_match_direct_predicates() {
        let db = catalog().await;
        let cases = [
            (
                MovieFilter {
                    genre: Some("drama".into()),
                    ..MovieFilter::default()
                },
                "genre LIKE '%drama%'",
            ),
            (
                MovieFilter {
                    year_from: Some(1980),
                    year_to: Some(2005),
                    ..MovieFilter::default()
                },
                "release_year BETWEEN 1980 AND 2005",
            ),
            (
                MovieFilter {
                    sources: vec![Platform::Amazon, Platform::Netflix],
                    search: Some("a".into()),
                    ..MovieFilter::default()
                },
                "(amazon_id != '' OR netflix_id != '') AND (title LIKE '%a%' OR description LIKE '%a%' OR genre LIKE '%a%')",
            ),
        ];
        for (filter, predicate) in cases {
            let page = list_movies(&db, &query(filter, Sort::default(), 1, 2))
                .await
                .unwrap();
            assert_eq!(page.total, direct_count(&db, predicate).await, "{predicate}");
            assert!(page.movies.len() <= 2);
        }
    }

    #[tokio::test]
    async fn default_sort_is_rating_desc_with_stable_ties() {
        let db = catalog().await;
        let page = list_movies(
            &db,
            &query(
                MovieFilter::default(),
                Sort::from_params(Some("bogus"), Some("ASC")),
                1,
                10,
            ),
        )
        .await
        .unwrap();
        let titles: Vec<&str> = page.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Alien", "Casablanca", "Amelie", "Brazil", "Drive"]
        );
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn pages_partition_the_result_set() {
        let db = catalog().await;
        let first = list_movies(&db, &query(MovieFilter::default(), Sort::default(), 1, 2))
            .await
            .unwrap();
        let third = list_movies(&db, &query(MovieFilter::default(), Sort::default(), 3, 2))
            .await
            .unwrap();
        let beyond = list_movies(&db, &query(MovieFilter::default(), Sort::default(), 9, 2))
            .await
            .unwrap();
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.movies.len(), 2);
        assert_eq!(third.movies.len(), 1);
        assert!(beyond.movies.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn listed_movies_are_normalized() {
        let db = catalog().await;
        let page = list_movies(
            &db,
            &query(
                MovieFilter {
                    search: Some("Drive".into()),
                    ..MovieFilter::default()
                },
                Sort::default(),
                1,
                10,
            ),
        )
        .await
        .unwrap();
        let drive = &page.movies[0];
        assert_eq!(drive.imdb_rating, 0.0);
        assert_eq!(drive.poster_url, crate::catalog::normalize::PLACEHOLDER_POSTER);
        assert_eq!(drive.num_sources, 1);
    }

    #[tokio::test]
    async fn detail_lookup_and_not_found() {
        let db = catalog().await;
        let detail = get_movie(&db, 5).await.unwrap();
        assert_eq!(detail.movie.title, "Amelie");
        assert_eq!(detail.movie.sources, vec!["netflix", "amazon", "imdb"]);
        assert!(detail.provenance.created_at.is_some());

        let missing = get_movie(&db, 999_999).await;
        assert!(matches!(missing, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn genres_are_distinct_and_sorted() {
        let db = catalog().await;
        assert_eq!(
            list_genres(&db).await.unwrap(),
            vec!["Comedy", "Crime", "Drama", "Horror", "Romance", "Sci-Fi"]
        );
    }

    #[tokio::test]
    async fn stats_over_catalog_and_empty_store() {
        let db = catalog().await;
        let s = stats(&db).await.unwrap();
        assert_eq!(s.total_movies, 5);
        assert_eq!(s.year_range.min, Some(1942));
        assert_eq!(s.year_range.max, Some(2001));
        assert_eq!(s.average_rating, 8.3);
        assert_eq!(
            s.platforms,
            PlatformCounts {
                netflix: 2,
                amazon: 2,
                imdb: 3
            }
        );

        let empty = memory_db().await;
        let s = stats(&empty).await.unwrap();
        assert_eq!(s.total_movies, 0);
        assert_eq!(s.year_range, YearRange { min: None, max: None });
        assert_eq!(s.average_rating, 0.0);
        assert_eq!(s.platforms.imdb, 0);
    }

    #[tokio::test]
    async fn suggestions_match_titles_best_rated_first() {
        let db = catalog().await;
        let hits = suggestions(&db, "  LI ").await.unwrap();
        let titles: Vec<&str> = hits.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "Amelie"]);
        assert_eq!(hits[0].release_year, Some(1979));
    }

    #[tokio::test]
    async fn suggestions_match_non_ascii_titles_exactly() {
        let db = memory_db().await;
        seed(
            &db,
            &[
                SeedMovie::new("r1", "Брат", 1997, Some(8.0), "Crime"),
                SeedMovie::new("f1", "Éclair de lune", 1990, Some(6.0), "Drama"),
            ],
        )
        .await;
        let hits = suggestions(&db, "Бр").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Брат");
        let hits = suggestions(&db, " Écl").await.unwrap();
        assert_eq!(hits[0].title, "Éclair de lune");
        assert_eq!(suggestion_needle("  Бр "), Some("Бр".to_string()));
        assert_eq!(suggestion_needle(" é "), None);
    }

    #[tokio::test]
    async fn text_in_numeric_columns_does_not_break_reads() {
        let db = memory_db().await;
        seed(&db, &[SeedMovie::new("k1", "Heat", 1995, Some(8.3), "Crime")]).await;
        sqlx::raw_sql(
            "INSERT INTO movies (canonical_key, title, imdb_rating, release_year, imdb_votes, poster_url) \
             VALUES ('k2', 'Loose', 'N/A', '2002', 'many', 'p')",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let page = list_movies(&db, &MovieQuery::default()).await.unwrap();
        assert_eq!(page.total, 2);
        let loose = page.movies.iter().find(|m| m.title == "Loose").unwrap();
        assert_eq!(loose.imdb_rating, 0.0);
        assert_eq!(loose.release_year, Some(2002));

        let detail = get_movie(&db, 2).await.unwrap();
        assert_eq!(detail.provenance.imdb_votes, None);

        let s = stats(&db).await.unwrap();
        assert_eq!(s.year_range, YearRange { min: Some(1995), max: Some(1995) });
        assert_eq!(s.average_rating, 8.3);

        let hits = suggestions(&db, "loo").await.unwrap();
        assert_eq!(hits[0].release_year, Some(2002));
    }

    #[tokio::test]
    async fn short_suggestion_queries_skip_the_store() {
        let db = memory_db().await;
        sqlx::query("DROP TABLE movies").execute(&db.pool).await.unwrap();
        assert!(suggestions(&db, "a").await.unwrap().is_empty());
        assert!(suggestions(&db, "  ").await.unwrap().is_empty());
        assert!(suggestions(&db, "ab").await.is_err());
    }
}
