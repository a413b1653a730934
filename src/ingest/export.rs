use crate::catalog::normalize::MovieRow;
use crate::catalog::store;
use crate::error::{CatalogError, Result};
use crate::util::db::Db;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const EXPORT_COLUMNS: [&str; 30] = [
    "id",
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
    "created_at",
];

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Raw stored values in [`EXPORT_COLUMNS`] order.
fn record(row: &MovieRow) -> [String; 30] {
    let s = &row.summary;
    let p = &row.provenance;
    [
        s.id.to_string(),
        opt(&s.canonical_key),
        s.title.clone(),
        opt(&s.release_year),
        opt(&s.imdb_rating),
        opt(&p.imdb_votes),
        opt(&s.genre),
        opt(&s.description),
        opt(&s.poster_url),
        opt(&p.language),
        opt(&s.imdb_id),
        opt(&s.sources),
        opt(&s.num_sources),
        opt(&s.netflix_id),
        opt(&p.netflix_director),
        opt(&p.netflix_cast),
        opt(&p.netflix_country),
        opt(&p.netflix_date_added),
        opt(&p.netflix_rating),
        opt(&p.netflix_duration),
        opt(&p.netflix_listed_in),
        opt(&s.amazon_id),
        opt(&p.amazon_director),
        opt(&p.amazon_cast),
        opt(&p.amazon_country),
        opt(&p.amazon_date_added),
        opt(&p.amazon_rating),
        opt(&p.amazon_duration),
        opt(&p.amazon_listed_in),
        opt(&p.created_at),
    ]
}

fn write_csv(path: &Path, rows: &[MovieRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    // BOM so spreadsheet tools pick up UTF-8
    file.write_all(b"\xEF\xBB\xBF")?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(EXPORT_COLUMNS)?;
    for row in rows {
        wtr.write_record(record(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Dump every stored row to `path`. An empty store is reported as not found.
#[instrument(skip(db, path), fields(path = %path.display()))]
pub async fn export_csv(db: &Db, path: &Path) -> Result<u64> {
    let rows = store::all_rows(db).await?;
    if rows.is_empty() {
        return Err(CatalogError::not_found("no movies to export"));
    }
    let count = rows.len() as u64;
    let target: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_csv(&target, &rows))
        .await
        .map_err(|e| CatalogError::Ingestion(format!("CSV export task failed: {e}")))??;
    info!(count, "catalog exported");
    Ok(count)
}
