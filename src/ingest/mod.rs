//! Bulk loading of the `movies` table from external files.
//!
//! Each [`DataSource`] pairs a path with an explicit [`SourceFormat`]; the
//! format tag alone selects the loader. Bootstrap walks an ordered candidate
//! list and stops at the first source that populates the store.

pub mod csv_source;
pub mod export;
pub mod sql_dump;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::util::db::Db;
use sqlx::SqliteConnection;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub use export::export_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceFormat {
    /// File of SQL statements separated by `;`.
    #[value(name = "sql")]
    SqlDump,
    /// Tabular export with a header row.
    Csv,
}

impl SourceFormat {
    /// `.sql` files are dumps, anything else is read as CSV.
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sql") => Self::SqlDump,
            _ => Self::Csv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
    pub format: SourceFormat,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self::new(path, SourceFormat::Csv)
    }

    pub fn sql_dump(path: impl Into<PathBuf>) -> Self {
        Self::new(path, SourceFormat::SqlDump)
    }

    /// First-run candidates: SQL dumps before tabular files, the data
    /// directory before the project root.
    pub fn candidates(config: &CatalogConfig) -> Vec<Self> {
        let data = &config.data_dir;
        let root = &config.root_dir;
        let mut out = Vec::with_capacity(10);
        for dir in [data, root] {
            for name in ["movies.sql", "database.sql", "data.sql"] {
                out.push(Self::sql_dump(dir.join(name)));
            }
        }
        for dir in [data, root] {
            for name in ["integrated_movies_with_posters.csv", "integrated_movies.csv"] {
                out.push(Self::csv(dir.join(name)));
            }
        }
        out
    }

    fn require_file(&self) -> Result<()> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(CatalogError::not_found(format!(
                "source file not found: {}",
                self.path.display()
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: PathBuf,
    pub format: SourceFormat,
    /// Rows written to the store.
    pub loaded: u64,
    /// Rows (CSV) or statements (SQL dump) that were skipped.
    pub skipped: u64,
}

impl LoadReport {
    fn new(path: &Path, format: SourceFormat) -> Self {
        Self {
            source: path.to_path_buf(),
            format,
            loaded: 0,
            skipped: 0,
        }
    }
}

async fn load_into(conn: &mut SqliteConnection, source: &DataSource) -> Result<LoadReport> {
    match source.format {
        SourceFormat::SqlDump => sql_dump::load(conn, &source.path).await,
        SourceFormat::Csv => csv_source::load(conn, &source.path).await,
    }
}

/// Append `source` to the store in one transaction.
#[instrument(skip(db))]
pub async fn load_source(db: &Db, source: &DataSource) -> Result<LoadReport> {
    source.require_file()?;
    let mut tx = db.pool.begin().await?;
    let report = load_into(&mut tx, source).await?;
    tx.commit().await?;
    Ok(report)
}

/// Clear the store and reload it from `source`.
///
/// The delete and the load share one transaction: concurrent readers keep
/// seeing the previous catalog until commit, never an empty table. A missing
/// file is reported before anything is touched.
#[instrument(skip(db))]
pub async fn bulk_replace(db: &Db, source: &DataSource) -> Result<LoadReport> {
    source.require_file()?;
    db.ensure_schema().await?;

    let mut tx = db.pool.begin().await?;
    let removed = sqlx::query("DELETE FROM movies")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let report = load_into(&mut tx, source).await?;
    tx.commit().await?;

    info!(
        removed,
        loaded = report.loaded,
        skipped = report.skipped,
        "catalog replaced"
    );
    Ok(report)
}

/// Ensure the schema and, when the store is empty, populate it from the
/// first candidate that exists and yields rows.
///
/// Returns the report of the winning source, or `None` when the store was
/// already populated or no candidate worked.
pub async fn bootstrap(db: &Db, candidates: &[DataSource]) -> Result<Option<LoadReport>> {
    db.ensure_schema().await?;
    let initial = db.count_movies().await?;
    info!(movies = initial, "initial catalog state");
    if initial > 0 {
        return Ok(None);
    }

    info!("catalog is empty, searching for data files");
    for source in candidates {
        if !source.path.is_file() {
            debug!(path = %source.path.display(), "candidate missing");
            continue;
        }
        info!(path = %source.path.display(), format = ?source.format, "found data file");
        match load_source(db, source).await {
            Ok(report) => {
                // a dump may recreate the table without our indexes
                db.ensure_schema().await?;
                if db.count_movies().await? > 0 {
                    info!(loaded = report.loaded, "catalog bootstrapped");
                    return Ok(Some(report));
                }
                warn!(path = %source.path.display(), "data file produced no movies");
            }
            Err(e) => {
                warn!(path = %source.path.display(), error = %e, "failed to load data file");
            }
        }
    }

    warn!("no data files found; starting with an empty catalog");
    Ok(None)
}
