use thiserror::Error;

/// Failures surfaced by the catalog store, loaders and query parsing.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed filter or pagination input.
    #[error("{0}")]
    Validation(String),

    /// Missing record or missing source file.
    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),

    /// A bulk load that could not run at all (individual bad rows are skipped, not raised).
    #[error("ingestion error: {0}")]
    Ingestion(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// HTTP status code this error maps to at the endpoint boundary.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
