//! Filter/sort/paginate query construction.
//!
//! A [`MovieQuery`] compiles into two statements: the page fetch and the
//! total count. Both are produced from one [`WhereClause`] so their filter
//! text and bound parameters can never drift apart; only the fetch statement
//! gets `ORDER BY` / `LIMIT` / `OFFSET` appended.

use crate::catalog::platform::Platform;
use crate::error::{CatalogError, Result};

/// Columns returned by list queries.
pub const SUMMARY_COLUMNS: &str = "id, canonical_key, title, release_year, imdb_rating, genre, \
    description, poster_url, sources, num_sources, netflix_id, amazon_id, imdb_id";

/// A positional bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Real(f64),
}

/// Allow-listed sort columns. Anything else never reaches the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Title,
    ReleaseYear,
    #[default]
    ImdbRating,
    NumSources,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "title" => Some(SortField::Title),
            "release_year" => Some(SortField::ReleaseYear),
            "imdb_rating" => Some(SortField::ImdbRating),
            "num_sources" => Some(SortField::NumSources),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::ReleaseYear => "release_year",
            SortField::ImdbRating => "imdb_rating",
            SortField::NumSources => "num_sources",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Case-insensitive; unrecognized values fall back to descending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    /// Resolve request values. An unknown or missing `sort_by` always means
    /// rating-descending, whatever `sort_order` says.
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        match sort_by.and_then(SortField::parse) {
            Some(field) => Sort {
                field,
                order: sort_order.map(SortOrder::parse).unwrap_or_default(),
            },
            None => Sort::default(),
        }
    }

    fn order_by_sql(self) -> String {
        format!(
            " ORDER BY {} {}, id ASC",
            self.field.column(),
            self.order.keyword()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if page < 1 {
            return Err(CatalogError::validation("page must be at least 1"));
        }
        if per_page < 1 {
            return Err(CatalogError::validation("per_page must be at least 1"));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    /// `max(1, ceil(total / per_page))`.
    pub fn total_pages(&self, total: i64) -> i64 {
        let per_page = i64::from(self.per_page);
        ((total.max(0) + per_page - 1) / per_page).max(1)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Optional, independently specified filter criteria. All present criteria are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    /// Substring of title, description or genre.
    pub search: Option<String>,
    /// Substring of the genre list.
    pub genre: Option<String>,
    pub year_from: Option<i64>,
    pub year_to: Option<i64>,
    pub min_rating: Option<f64>,
    /// A row matches when present on at least one of these platforms.
    pub sources: Vec<Platform>,
}

/// Filter fragment shared verbatim by the fetch and count statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl MovieFilter {
    pub fn where_clause(&self) -> WhereClause {
        let mut clause = WhereClause {
            sql: String::from(" WHERE 1=1"),
            params: Vec::new(),
        };

        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            clause.sql.push_str(
                " AND (title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' OR genre LIKE ? ESCAPE '\\')",
            );
            for _ in 0..3 {
                clause.params.push(SqlParam::Text(pattern.clone()));
            }
        }

        if let Some(genre) = &self.genre {
            clause.sql.push_str(" AND genre LIKE ? ESCAPE '\\'");
            clause.params.push(SqlParam::Text(like_pattern(genre)));
        }

        if let Some(year_from) = self.year_from {
            clause.sql.push_str(" AND release_year >= ?");
            clause.params.push(SqlParam::Int(year_from));
        }

        if let Some(year_to) = self.year_to {
            clause.sql.push_str(" AND release_year <= ?");
            clause.params.push(SqlParam::Int(year_to));
        }

        if let Some(min_rating) = self.min_rating {
            clause.sql.push_str(" AND imdb_rating >= ?");
            clause.params.push(SqlParam::Real(min_rating));
        }

        let mut platforms: Vec<Platform> = Vec::with_capacity(self.sources.len());
        for p in &self.sources {
            if !platforms.contains(p) {
                platforms.push(*p);
            }
        }
        if !platforms.is_empty() {
            let any_of: Vec<String> = platforms.iter().map(|p| p.presence_sql()).collect();
            clause.sql.push_str(" AND (");
            clause.sql.push_str(&any_of.join(" OR "));
            clause.sql.push(')');
        }

        clause
    }
}

/// Wrap a user substring as a `LIKE` pattern, escaping its own wildcards.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieQuery {
    pub filter: MovieFilter,
    pub sort: Sort,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// The page fetch and its matching count.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub fetch: BuiltStatement,
    pub count: BuiltStatement,
}

impl MovieQuery {
    pub fn build(&self) -> CatalogQuery {
        let WhereClause { sql: filter, params } = self.filter.where_clause();

        let count = BuiltStatement {
            sql: format!("SELECT COUNT(*) FROM movies{filter}"),
            params: params.clone(),
        };

        let mut fetch_params = params;
        fetch_params.push(SqlParam::Int(i64::from(self.pagination.per_page())));
        fetch_params.push(SqlParam::Int(self.pagination.offset()));
        let fetch = BuiltStatement {
            sql: format!(
                "SELECT {SUMMARY_COLUMNS} FROM movies{filter}{} LIMIT ? OFFSET ?",
                self.sort.order_by_sql()
            ),
            params: fetch_params,
        };

        CatalogQuery { fetch, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_filter() -> MovieFilter {
        MovieFilter {
            search: Some("star".into()),
            genre: Some("Drama".into()),
            year_from: Some(1990),
            year_to: Some(2005),
            min_rating: Some(7.5),
            sources: vec![Platform::Netflix, Platform::Imdb],
        }
    }

    #[test]
    fn fetch_and_count_share_filter_text_and_params() {
        let query = MovieQuery {
            filter: full_filter(),
            sort: Sort::from_params(Some("title"), Some("ASC")),
            pagination: Pagination::new(3, 10).unwrap(),
        };
        let built = query.build();

        let count_where = built.count.sql.split(" FROM movies").nth(1).unwrap();
        let fetch_where = built
            .fetch
            .sql
            .split(" FROM movies")
            .nth(1)
            .unwrap()
            .split(" ORDER BY")
            .next()
            .unwrap();
        assert_eq!(count_where, fetch_where);

        let n = built.count.params.len();
        assert_eq!(n, 7);
        assert_eq!(&built.fetch.params[..n], &built.count.params[..]);
        assert_eq!(
            &built.fetch.params[n..],
            &[SqlParam::Int(10), SqlParam::Int(20)]
        );
        assert!(built.fetch.sql.ends_with("ORDER BY title ASC, id ASC LIMIT ? OFFSET ?"));
    }

    #[test]
    fn placeholders_match_param_count() {
        let built = MovieQuery {
            filter: full_filter(),
            ..MovieQuery::default()
        }
        .build();
        assert_eq!(
            built.count.sql.matches('?').count(),
            built.count.params.len()
        );
        assert_eq!(
            built.fetch.sql.matches('?').count(),
            built.fetch.params.len()
        );
    }

    #[test]
    fn empty_filter_is_trivially_true() {
        let built = MovieQuery::default().build();
        assert_eq!(built.count.sql, "SELECT COUNT(*) FROM movies WHERE 1=1");
        assert!(built.count.params.is_empty());
        assert!(built
            .fetch
            .sql
            .contains("WHERE 1=1 ORDER BY imdb_rating DESC, id ASC"));
    }

    #[test]
    fn platforms_are_ored_and_deduplicated() {
        let filter = MovieFilter {
            sources: vec![Platform::Amazon, Platform::Netflix, Platform::Amazon],
            ..MovieFilter::default()
        };
        let clause = filter.where_clause();
        assert_eq!(
            clause.sql,
            " WHERE 1=1 AND ((amazon_id IS NOT NULL AND amazon_id != '') OR (netflix_id IS NOT NULL AND netflix_id != ''))"
        );
        assert!(clause.params.is_empty());
    }

    #[test]
    fn unknown_sort_field_falls_back_to_rating_desc() {
        for (by, order) in [
            (Some("created_at; DROP TABLE movies"), Some("ASC")),
            (Some("popularity"), None),
            (None, Some("asc")),
        ] {
            let sort = Sort::from_params(by, order);
            assert_eq!(sort.field, SortField::ImdbRating);
            assert_eq!(sort.order, SortOrder::Desc);
        }
    }

    #[test]
    fn sort_order_never_reaches_sql_verbatim() {
        let sort = Sort::from_params(Some("release_year"), Some("ASC; DELETE FROM movies"));
        assert_eq!(sort.order, SortOrder::Desc);
        let sort = Sort::from_params(Some("release_year"), Some("asc"));
        assert_eq!(sort.order, SortOrder::Asc);
        assert_eq!(sort.order_by_sql(), " ORDER BY release_year ASC, id ASC");
    }

    #[test]
    fn total_pages_has_floor_of_one() {
        let p = Pagination::new(1, 20).unwrap();
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(20), 1);
        assert_eq!(p.total_pages(21), 2);
        assert_eq!(Pagination::new(1, 7).unwrap().total_pages(100), 15);
    }

    #[test]
    fn pagination_rejects_zero() {
        assert!(matches!(
            Pagination::new(0, 10),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            Pagination::new(1, 0),
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(Pagination::new(4, 25).unwrap().offset(), 75);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("100%_x\\"), "%100\\%\\_x\\\\%");
    }
}
