use serde::Serialize;

/// Source platforms a movie's metadata can be aggregated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Netflix,
    Amazon,
    /// Ratings provider; presence is signalled by a poster URL.
    Imdb,
}

impl Platform {
    /// Derivation order used when a record carries no stored source list.
    pub const ALL: [Platform; 3] = [Platform::Netflix, Platform::Amazon, Platform::Imdb];

    pub fn tag(self) -> &'static str {
        match self {
            Platform::Netflix => "netflix",
            Platform::Amazon => "amazon",
            Platform::Imdb => "imdb",
        }
    }

    /// Parse a request tag (case-insensitive). Unknown tags yield `None`.
    pub fn from_tag(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "netflix" => Some(Platform::Netflix),
            "amazon" => Some(Platform::Amazon),
            "imdb" => Some(Platform::Imdb),
            _ => None,
        }
    }

    /// Column whose non-empty value marks the movie as present on this platform.
    pub fn presence_column(self) -> &'static str {
        match self {
            Platform::Netflix => "netflix_id",
            Platform::Amazon => "amazon_id",
            Platform::Imdb => "poster_url",
        }
    }

    /// SQL predicate for presence; shared by the list filter and the stats query.
    pub fn presence_sql(self) -> String {
        let col = self.presence_column();
        format!("({col} IS NOT NULL AND {col} != '')")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_case_insensitively() {
        for p in Platform::ALL {
            assert_eq!(Platform::from_tag(p.tag()), Some(p));
            assert_eq!(Platform::from_tag(&p.tag().to_uppercase()), Some(p));
        }
        assert_eq!(Platform::from_tag("hulu"), None);
    }

    #[test]
    fn ratings_provider_presence_uses_poster() {
        assert_eq!(
            Platform::Imdb.presence_sql(),
            "(poster_url IS NOT NULL AND poster_url != '')"
        );
    }
}
