// Bulk data commands: bootstrap, replace from file, export

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::CatalogConfig;
use crate::ingest::{self, DataSource, LoadReport, SourceFormat};
use crate::util::db::Db;

fn print_report(action: &str, report: &LoadReport) {
    println!(
        "{action}: {} movies from {} ({:?}), {} skipped",
        report.loaded,
        report.source.display(),
        report.format,
        report.skipped
    );
}

pub async fn bootstrap(db: &Db, config: &CatalogConfig) -> Result<()> {
    match ingest::bootstrap(db, &DataSource::candidates(config)).await? {
        Some(report) => print_report("bootstrapped", &report),
        None => println!("catalog holds {} movies; nothing loaded", db.count_movies().await?),
    }
    Ok(())
}

/// Replace the catalog with `path`; the format is inferred from the
/// extension unless given.
pub async fn load(db: &Db, path: &Path, format: Option<SourceFormat>) -> Result<LoadReport> {
    let format = format.unwrap_or_else(|| SourceFormat::infer(path));
    let source = DataSource::new(path, format);
    let report = ingest::bulk_replace(db, &source)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;
    print_report("loaded", &report);
    Ok(report)
}

pub async fn export(db: &Db, config: &CatalogConfig, path: Option<PathBuf>) -> Result<u64> {
    let path = path.unwrap_or_else(|| config.export_csv_path());
    let count = ingest::export_csv(db, &path)
        .await
        .with_context(|| format!("failed to export to {}", path.display()))?;
    info!(count, path = %path.display(), "export finished");
    println!("exported {count} movies to {}", path.display());
    Ok(count)
}
