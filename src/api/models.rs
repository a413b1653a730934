// API response envelopes and payloads

use crate::catalog::store::{CatalogStats, Suggestion};
use crate::catalog::MovieDetail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper: `{success, ...payload}` or `{success:false, error}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub movie: MovieDetail,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: CatalogStats,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// Result of an admin bulk replace.
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub message: String,
    pub count: u64,
    pub skipped: u64,
}

/// Result of an admin export.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub message: String,
    pub file: String,
    pub count: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub movies_count: i64,
    pub timestamp: DateTime<Utc>,
}
