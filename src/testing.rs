//! Shared fixtures for store-backed tests.

use crate::util::db::Db;

pub async fn memory_db() -> Db {
    let db = Db::connect_in_memory().await.unwrap();
    db.ensure_schema().await.unwrap();
    db
}

#[derive(Debug, Clone)]
pub struct SeedMovie {
    canonical_key: String,
    title: String,
    release_year: i64,
    imdb_rating: Option<f64>,
    genre: String,
    poster_url: String,
    sources: Option<String>,
    netflix_id: Option<String>,
    amazon_id: Option<String>,
}

impl SeedMovie {
    pub fn new(key: &str, title: &str, year: i64, rating: Option<f64>, genre: &str) -> Self {
        Self {
            canonical_key: key.to_string(),
            title: title.to_string(),
            release_year: year,
            imdb_rating: rating,
            genre: genre.to_string(),
            poster_url: format!("https://img.example/{key}.jpg"),
            sources: None,
            netflix_id: None,
            amazon_id: None,
        }
    }

    pub fn poster(mut self, url: &str) -> Self {
        self.poster_url = url.to_string();
        self
    }

    pub fn sources(mut self, joined: &str) -> Self {
        self.sources = Some(joined.to_string());
        self
    }

    pub fn netflix(mut self, id: &str) -> Self {
        self.netflix_id = Some(id.to_string());
        self
    }

    pub fn amazon(mut self, id: &str) -> Self {
        self.amazon_id = Some(id.to_string());
        self
    }
}

pub async fn seed(db: &Db, movies: &[SeedMovie]) {
    for m in movies {
        sqlx::query(
            "INSERT INTO movies (canonical_key, title, release_year, imdb_rating, genre, \
             poster_url, sources, netflix_id, amazon_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&m.canonical_key)
        .bind(&m.title)
        .bind(m.release_year)
        .bind(m.imdb_rating)
        .bind(&m.genre)
        .bind(&m.poster_url)
        .bind(&m.sources)
        .bind(&m.netflix_id)
        .bind(&m.amazon_id)
        .execute(&db.pool)
        .await
        .unwrap();
    }
}
