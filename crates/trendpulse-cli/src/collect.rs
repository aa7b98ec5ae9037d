//! `collect` command: recorded collection runs for each requested country.

use trendpulse_collector::{run_recorded_collection, TrendCollector};
use trendpulse_core::AppConfig;

/// Collect each country in turn. Countries default to the configured list.
///
/// # Errors
///
/// Returns an error if the collector cannot be built or if any country's
/// run failed. Every country is attempted before failing.
pub(crate) async fn run_collect(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    countries: &[String],
) -> anyhow::Result<()> {
    let targets = resolve_countries(countries, &config.countries);
    let collector = TrendCollector::from_config(pool.clone(), config)?;

    println!(
        "{:<8}{:<8}{:<8}{:<8}{:<10}FAILED SOURCES",
        "COUNTRY", "ITEMS", "VIDEOS", "NEWS", "SCORE"
    );

    let mut failed = 0usize;
    for country in &targets {
        match run_recorded_collection(pool, &collector, country, "cli").await {
            Ok(recorded) => {
                let s = &recorded.summary;
                let score = s
                    .composite_score
                    .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
                let sources: Vec<&str> =
                    s.source_failures.iter().map(|f| f.source.as_str()).collect();
                println!(
                    "{:<8}{:<8}{:<8}{:<8}{:<10}{}",
                    s.country,
                    s.item_count,
                    s.video_items,
                    s.news_items,
                    score,
                    if sources.is_empty() {
                        "-".to_string()
                    } else {
                        sources.join(",")
                    }
                );
            }
            Err(e) => {
                tracing::error!(country = %country, error = %e, "collection failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} collection run(s) failed", targets.len());
    }
    Ok(())
}

/// Explicit countries win over the configured list.
pub(crate) fn resolve_countries(requested: &[String], configured: &[String]) -> Vec<String> {
    if requested.is_empty() {
        configured.to_vec()
    } else {
        requested.to_vec()
    }
}
