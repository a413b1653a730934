//! Runtime configuration for the catalog API and admin CLI.
//!
//! Built once at startup and passed explicitly to the store, the loaders and
//! the HTTP server.

use crate::util::env as env_util;
use std::path::PathBuf;

/// File the admin bulk-replace endpoint loads from (inside `data_dir`).
pub const ADMIN_CSV_FILE: &str = "integrated_movies_with_posters.csv";
/// File the admin export endpoint writes to (inside `data_dir`).
pub const EXPORT_CSV_FILE: &str = "exported_movies.csv";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory holding dump/CSV files for ingestion and export.
    pub data_dir: PathBuf,
    /// Project root, searched after `data_dir` during bootstrap.
    pub root_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Comma-separated origins for CORS, or `*`.
    pub allowed_origins: String,
    pub max_connections: u32,
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("database/movies.db"),
            data_dir: PathBuf::from("data"),
            root_dir: PathBuf::from("."),
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: "*".to_string(),
            max_connections: 5,
            default_per_page: 20,
            max_per_page: 100,
        }
    }
}

impl CatalogConfig {
    /// Build configuration from environment variables (after loading `.env`).
    pub fn from_env() -> Self {
        env_util::init_env();
        let defaults = Self::default();

        Self {
            database_path: env_util::env_path("CATALOG_DB_PATH", "database/movies.db"),
            data_dir: env_util::env_path("CATALOG_DATA_DIR", "data"),
            root_dir: env_util::env_path("CATALOG_ROOT_DIR", "."),
            host: env_util::env_opt("API_HOST").unwrap_or(defaults.host),
            port: env_util::env_parse("API_PORT", defaults.port),
            allowed_origins: env_util::env_opt("ALLOWED_ORIGINS")
                .unwrap_or(defaults.allowed_origins),
            max_connections: env_util::env_parse("DB_MAX_CONNS", defaults.max_connections).max(1),
            default_per_page: env_util::env_parse(
                "CATALOG_DEFAULT_PER_PAGE",
                defaults.default_per_page,
            )
            .max(1),
            max_per_page: env_util::env_parse("CATALOG_MAX_PER_PAGE", defaults.max_per_page)
                .max(1),
        }
    }

    pub fn admin_csv_path(&self) -> PathBuf {
        self.data_dir.join(ADMIN_CSV_FILE)
    }

    pub fn export_csv_path(&self) -> PathBuf {
        self.data_dir.join(EXPORT_CSV_FILE)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the database parent directory and the data directory if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_in_data_dir() {
        let cfg = CatalogConfig {
            data_dir: PathBuf::from("/srv/catalog/data"),
            ..CatalogConfig::default()
        };
        assert_eq!(
            cfg.admin_csv_path(),
            PathBuf::from("/srv/catalog/data/integrated_movies_with_posters.csv")
        );
        assert_eq!(
            cfg.export_csv_path(),
            PathBuf::from("/srv/catalog/data/exported_movies.csv")
        );
    }

    #[test]
    fn ensure_dirs_creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = CatalogConfig {
            database_path: tmp.path().join("db/nested/movies.db"),
            data_dir: tmp.path().join("data"),
            ..CatalogConfig::default()
        };
        cfg.ensure_dirs().unwrap();
        assert!(tmp.path().join("db/nested").is_dir());
        assert!(tmp.path().join("data").is_dir());
    }
}
