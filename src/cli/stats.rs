use anyhow::Result;
use std::fmt::Write;

use crate::catalog::store::{self, CatalogStats};
use crate::util::db::Db;

#[derive(Debug, Clone, Default)]
pub struct StatsConfig {
    /// Print the raw stats object as JSON instead of the text summary.
    pub json: bool,
    /// Also write the summary to this file.
    pub out_file: Option<std::path::PathBuf>,
}

fn render(stats: &CatalogStats, genres: usize) -> String {
    let mut out = String::new();
    writeln!(out, "CATALOG SUMMARY:").ok();
    writeln!(out, "movies: {}", stats.total_movies).ok();
    match (stats.year_range.min, stats.year_range.max) {
        (Some(min), Some(max)) => writeln!(out, "years: {min}-{max}").ok(),
        _ => writeln!(out, "years: n/a").ok(),
    };
    writeln!(out, "average rating: {:.2}", stats.average_rating).ok();
    writeln!(out, "genres: {genres}").ok();
    writeln!(out, "platforms:").ok();
    writeln!(out, "  netflix: {}", stats.platforms.netflix).ok();
    writeln!(out, "  amazon: {}", stats.platforms.amazon).ok();
    writeln!(out, "  imdb: {}", stats.platforms.imdb).ok();
    out
}

pub async fn run(db: &Db, cfg: StatsConfig) -> Result<()> {
    let stats = store::stats(db).await?;
    let out = if cfg.json {
        serde_json::to_string_pretty(&stats)?
    } else {
        let genres = store::list_genres(db).await?.len();
        render(&stats, genres)
    };
    println!("{}", out);

    if let Some(path) = cfg.out_file {
        std::fs::write(&path, &out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_db, seed, SeedMovie};

    #[tokio::test]
    async fn summary_lists_every_platform() {
        let db = memory_db().await;
        seed(
            &db,
            &[
                SeedMovie::new("k1", "Heat", 1995, Some(8.3), "Crime, Drama").netflix("s1"),
                SeedMovie::new("k2", "Ran", 1985, Some(8.1), "Drama").amazon("a1"),
            ],
        )
        .await;
        let stats = store::stats(&db).await.unwrap();
        let text = render(&stats, 2);
        assert!(text.contains("movies: 2"));
        assert!(text.contains("years: 1985-1995"));
        assert!(text.contains("average rating: 8.20"));
        assert!(text.contains("  netflix: 1"));
        assert!(text.contains("  imdb: 2"));
    }

    #[tokio::test]
    async fn json_output_can_be_written_to_file() {
        let db = memory_db().await;
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stats.json");
        run(
            &db,
            StatsConfig {
                json: true,
                out_file: Some(path.clone()),
            },
        )
        .await
        .unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["total_movies"], 0);
    }
}
