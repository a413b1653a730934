// HTTP API server binary for the movie catalog

use anyhow::Result;
use movie_catalog::api::ApiServer;
use movie_catalog::logging::{init_tracing, DEFAULT_FILTER};
use movie_catalog::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load dotenv/env once so RUST_LOG from .env is honored
    env_util::init_env();
    init_tracing(DEFAULT_FILTER)?;

    tracing::info!("Initializing movie catalog API server");

    ApiServer::from_env().serve().await
}
