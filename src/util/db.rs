use crate::error::Result;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Columns written by the loaders, in insert order. `id` and `created_at` are
/// assigned by the store.
pub const MOVIE_COLUMNS: [&str; 28] = [
    "canonical_key",
    "title",
    "release_year",
    "imdb_rating",
    "imdb_votes",
    "genre",
    "description",
    "poster_url",
    "language",
    "imdb_id",
    "sources",
    "num_sources",
    "netflix_id",
    "netflix_director",
    "netflix_cast",
    "netflix_country",
    "netflix_date_added",
    "netflix_rating",
    "netflix_duration",
    "netflix_listed_in",
    "amazon_id",
    "amazon_director",
    "amazon_cast",
    "amazon_country",
    "amazon_date_added",
    "amazon_rating",
    "amazon_duration",
    "amazon_listed_in",
];

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        canonical_key TEXT UNIQUE,
        title TEXT NOT NULL,
        release_year INTEGER,
        imdb_rating REAL,
        imdb_votes INTEGER,
        genre TEXT,
        description TEXT,
        poster_url TEXT NOT NULL,
        language TEXT,
        imdb_id TEXT,
        sources TEXT,
        num_sources INTEGER,
        netflix_id TEXT,
        netflix_director TEXT,
        netflix_cast TEXT,
        netflix_country TEXT,
        netflix_date_added TEXT,
        netflix_rating TEXT,
        netflix_duration TEXT,
        netflix_listed_in TEXT,
        amazon_id TEXT,
        amazon_director TEXT,
        amazon_cast TEXT,
        amazon_country TEXT,
        amazon_date_added TEXT,
        amazon_rating TEXT,
        amazon_duration TEXT,
        amazon_listed_in TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_title ON movies(title)",
    "CREATE INDEX IF NOT EXISTS idx_year ON movies(release_year)",
    "CREATE INDEX IF NOT EXISTS idx_rating ON movies(imdb_rating)",
    "CREATE INDEX IF NOT EXISTS idx_sources ON movies(num_sources)",
];

#[derive(Clone, Debug)]
pub struct Db {
    pub pool: SqlitePool,
}

impl Db {
    /// Open (creating if needed) the SQLite file at `path`.
    ///
    /// WAL mode lets readers keep their snapshot while a bulk replace is being
    /// written in its own transaction.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn connect(path: &Path, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(options)
            .await?;
        info!(max_connections, "connected to sqlite store");
        Ok(Self { pool })
    }

    /// Single-connection in-memory store. Every pooled connection to
    /// `:memory:` would see its own database, so the pool is pinned to one.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create the `movies` table and its indexes when missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        debug!("schema ensured");
        Ok(())
    }

    pub async fn count_movies(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
