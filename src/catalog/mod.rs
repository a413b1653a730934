//! Read side of the movie catalog: query construction, row normalization and
//! the store operations behind the HTTP endpoints.

pub mod lenient;
pub mod normalize;
pub mod platform;
pub mod query;
pub mod store;

pub use normalize::{Movie, MovieDetail, PLACEHOLDER_POSTER};
pub use platform::Platform;
pub use query::{MovieFilter, MovieQuery, Pagination, Sort, SortField, SortOrder};
