use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use movie_catalog::api::ApiServer;
use movie_catalog::cli::{data, stats};
use movie_catalog::config::CatalogConfig;
use movie_catalog::ingest::SourceFormat;
use movie_catalog::logging::{init_tracing, DEFAULT_FILTER};
use movie_catalog::util::db::Db;
use movie_catalog::util::env;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Movie catalog admin CLI")]
struct Cli {
    /// SQLite database file (overrides CATALOG_DB_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// Directory holding data files (overrides CATALOG_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Bootstrap the store if empty, then serve the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the schema and load the first available data file into an empty store
    Bootstrap,
    /// Replace the whole catalog with the contents of a file
    Load {
        path: PathBuf,
        /// Defaults to sql for `.sql` files, csv otherwise
        #[arg(long, value_enum)]
        format: Option<SourceFormat>,
    },
    /// Write every stored movie to a CSV file
    Export {
        /// Defaults to <data-dir>/exported_movies.csv
        path: Option<PathBuf>,
    },
    /// Print catalog statistics
    Stats {
        #[arg(long, default_value_t = false)]
        json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

async fn open_store(config: &CatalogConfig) -> Result<Db> {
    config
        .ensure_dirs()
        .context("failed to create catalog directories")?;
    let db = Db::connect(&config.database_path, config.max_connections)
        .await
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    db.ensure_schema().await?;
    Ok(db)
}

#[actix_web::main]
async fn main() -> Result<()> {
    env::init_env();
    init_tracing(DEFAULT_FILTER)?;

    let cli = Cli::parse();
    let mut config = CatalogConfig::from_env();
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            info!(addr = %config.bind_addr(), "serve: starting");
            ApiServer::new(config).serve().await?;
        }
        Commands::Bootstrap => {
            let db = open_store(&config).await?;
            data::bootstrap(&db, &config).await?;
        }
        Commands::Load { path, format } => {
            let db = open_store(&config).await?;
            data::load(&db, &path, format).await?;
        }
        Commands::Export { path } => {
            let db = open_store(&config).await?;
            data::export(&db, &config, path).await?;
        }
        Commands::Stats { json, out } => {
            let db = open_store(&config).await?;
            stats::run(
                &db,
                stats::StatsConfig {
                    json,
                    out_file: out,
                },
            )
            .await?;
        }
    }

    Ok(())
}
