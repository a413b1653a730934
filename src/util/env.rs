//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Path-valued env var with a default.
pub fn env_path(key: &str, default: &str) -> PathBuf {
    env_opt(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_falls_back_on_garbage() {
        std::env::set_var("MOVIE_CATALOG_TEST_PARSE", "not-a-number");
        assert_eq!(env_parse("MOVIE_CATALOG_TEST_PARSE", 7u32), 7);
        std::env::set_var("MOVIE_CATALOG_TEST_PARSE", " 12 ");
        assert_eq!(env_parse("MOVIE_CATALOG_TEST_PARSE", 7u32), 12);
    }

    #[test]
    fn blank_values_are_unset() {
        std::env::set_var("MOVIE_CATALOG_TEST_BLANK", "   ");
        assert!(env_opt("MOVIE_CATALOG_TEST_BLANK").is_none());
        assert_eq!(
            env_path("MOVIE_CATALOG_TEST_BLANK", "data"),
            PathBuf::from("data")
        );
    }
}
