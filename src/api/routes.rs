// API route configuration

use crate::api::handlers;
use crate::error::CatalogError;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| CatalogError::not_found(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| CatalogError::validation(err.to_string()).into()),
    )
    .route("/health", web::get().to(handlers::health_check))
    .service(
        web::scope("/api")
            .route("/movies", web::get().to(handlers::list_movies))
            .route("/movies/{id}", web::get().to(handlers::get_movie))
            .route("/genres", web::get().to(handlers::list_genres))
            .route("/stats", web::get().to(handlers::get_stats))
            .route(
                "/search/suggestions",
                web::get().to(handlers::search_suggestions),
            )
            // Admin
            .route("/admin/load-csv", web::post().to(handlers::admin_load_csv))
            .route(
                "/admin/export-csv",
                web::get().to(handlers::admin_export_csv),
            ),
    );
}
