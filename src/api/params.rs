// Query-string parsing for the movie list endpoint

use crate::catalog::{MovieFilter, MovieQuery, Pagination, Platform, Sort};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use std::str::FromStr;

/// Raw list parameters as received. `sources` may repeat.
#[derive(Debug, Default)]
struct RawListParams {
    search: Option<String>,
    genre: Option<String>,
    year_from: Option<String>,
    year_to: Option<String>,
    min_rating: Option<String>,
    sources: Vec<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    page: Option<String>,
    per_page: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn parse_number<T: FromStr>(name: &str, raw: Option<&str>, expected: &str) -> Result<Option<T>> {
    raw.map(|v| {
        v.parse::<T>()
            .map_err(|_| CatalogError::validation(format!("{name} must be {expected}, got `{v}`")))
    })
    .transpose()
}

/// Parse the list endpoint's query string into a validated [`MovieQuery`].
///
/// Blank values count as absent. Unknown platform tags are ignored. `per_page`
/// is clamped to the configured maximum.
pub fn parse_movie_query(query_string: &str, config: &CatalogConfig) -> Result<MovieQuery> {
    let mut raw = RawListParams::default();
    for (key, value) in url::form_urlencoded::parse(query_string.as_bytes()) {
        let value = non_blank(&value);
        match key.as_ref() {
            "search" => raw.search = value,
            "genre" => raw.genre = value,
            "year_from" => raw.year_from = value,
            "year_to" => raw.year_to = value,
            "min_rating" => raw.min_rating = value,
            "sources" => raw.sources.extend(value),
            "sort_by" => raw.sort_by = value,
            "sort_order" => raw.sort_order = value,
            "page" => raw.page = value,
            "per_page" => raw.per_page = value,
            _ => {}
        }
    }

    let min_rating: Option<f64> =
        parse_number("min_rating", raw.min_rating.as_deref(), "a number")?;
    if min_rating.is_some_and(|r| !r.is_finite()) {
        return Err(CatalogError::validation("min_rating must be a finite number"));
    }

    let filter = MovieFilter {
        search: raw.search,
        genre: raw.genre,
        year_from: parse_number("year_from", raw.year_from.as_deref(), "an integer")?,
        year_to: parse_number("year_to", raw.year_to.as_deref(), "an integer")?,
        min_rating,
        sources: raw
            .sources
            .iter()
            .filter_map(|tag| Platform::from_tag(tag))
            .collect(),
    };

    let page: u32 =
        parse_number("page", raw.page.as_deref(), "a positive integer")?.unwrap_or(1);
    let per_page: u32 = parse_number("per_page", raw.per_page.as_deref(), "a positive integer")?
        .unwrap_or(config.default_per_page);
    let pagination = Pagination::new(page, per_page.min(config.max_per_page))?;

    Ok(MovieQuery {
        filter,
        sort: Sort::from_params(raw.sort_by.as_deref(), raw.sort_order.as_deref()),
        pagination,
    })
}
