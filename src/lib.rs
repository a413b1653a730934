pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;

pub mod util {
    pub mod db;
    pub mod env;
}

#[cfg(test)]
mod testing;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use util::db::Db;
