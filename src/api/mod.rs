// HTTP API for browsing the movie catalog

mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod params;
pub mod routes;
pub mod server;

pub use server::ApiServer;
