// API server implementation using actix-web

use crate::api::{middleware, routes};
use crate::config::CatalogConfig;
use crate::ingest::{self, DataSource};
use crate::util::db::Db;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

pub struct ApiServer {
    pub config: CatalogConfig,
}

impl ApiServer {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Create server from environment variables
    pub fn from_env() -> Self {
        Self::new(CatalogConfig::from_env())
    }

    /// Open the store, bootstrap it from the first available data file when
    /// empty, then serve until shutdown.
    pub async fn serve(self) -> Result<()> {
        self.config
            .ensure_dirs()
            .context("failed to create catalog directories")?;
        let db = Db::connect(&self.config.database_path, self.config.max_connections)
            .await
            .with_context(|| {
                format!(
                    "failed to open database {}",
                    self.config.database_path.display()
                )
            })?;

        ingest::bootstrap(&db, &DataSource::candidates(&self.config))
            .await
            .context("failed to bootstrap catalog")?;

        self.run(db).await
    }

    /// Start the HTTP server
    pub async fn run(self, db: Db) -> Result<()> {
        let bind_addr = self.config.bind_addr();

        tracing::info!(
            host = %self.config.host,
            port = %self.config.port,
            database = %self.config.database_path.display(),
            "Starting movie catalog API server"
        );

        let db_data = web::Data::new(db);
        let allowed_origins = self.config.allowed_origins.clone();
        let config_data = web::Data::new(self.config);

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();
            let cors = middleware::setup_cors(&allowed_origins);

            App::new()
                .app_data(db_data.clone())
                .app_data(config_data.clone())
                .wrap(logger)
                .wrap(compress)
                .wrap(cors)
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
