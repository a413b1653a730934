// HTTP request handlers for API endpoints

use crate::api::models::*;
use crate::api::params::parse_movie_query;
use crate::catalog::store;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::ingest::{self, DataSource};
use crate::util::db::Db;
use actix_web::{web, HttpRequest, HttpResponse};

/// Health check endpoint
pub async fn health_check(db: web::Data<Db>) -> HttpResponse {
    match db.count_movies().await {
        Ok(movies_count) => HttpResponse::Ok().json(ApiResponse::success(HealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            movies_count,
            timestamp: chrono::Utc::now(),
        })),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "status": "unhealthy",
                "error": e.to_string(),
            }))
        }
    }
}

/// Filtered, sorted, paginated movie list
pub async fn list_movies(
    req: HttpRequest,
    db: web::Data<Db>,
    config: web::Data<CatalogConfig>,
) -> Result<HttpResponse> {
    let query = parse_movie_query(req.query_string(), &config)?;
    let page = store::list_movies(&db, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_movie(path: web::Path<i64>, db: web::Data<Db>) -> Result<HttpResponse> {
    let movie = store::get_movie(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MovieResponse { movie })))
}

pub async fn list_genres(db: web::Data<Db>) -> Result<HttpResponse> {
    let genres = store::list_genres(&db).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(GenresResponse { genres })))
}

pub async fn get_stats(db: web::Data<Db>) -> Result<HttpResponse> {
    let stats = store::stats(&db).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(StatsResponse { stats })))
}

pub async fn search_suggestions(
    query: web::Query<SuggestionQuery>,
    db: web::Data<Db>,
) -> Result<HttpResponse> {
    let suggestions = store::suggestions(&db, &query.q).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(SuggestionsResponse { suggestions })))
}

/// Replace the whole catalog with the admin CSV file
pub async fn admin_load_csv(
    db: web::Data<Db>,
    config: web::Data<CatalogConfig>,
) -> Result<HttpResponse> {
    let source = DataSource::csv(config.admin_csv_path());
    tracing::info!(path = %source.path.display(), "bulk replace requested");

    let report = ingest::bulk_replace(&db, &source).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(LoadResponse {
        message: format!("Loaded {} movies", report.loaded),
        count: report.loaded,
        skipped: report.skipped,
    })))
}

pub async fn admin_export_csv(
    db: web::Data<Db>,
    config: web::Data<CatalogConfig>,
) -> Result<HttpResponse> {
    let path = config.export_csv_path();
    let count = ingest::export_csv(&db, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ExportResponse {
        message: format!("Exported {count} movies"),
        file: path.display().to_string(),
        count,
    })))
}
