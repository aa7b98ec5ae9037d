//! Database operations for `keyword_buckets`.
//!
//! A bucket is the daily per-country aggregation root. Its `keyword` column
//! holds the day label and is unique, so resolution is a single atomic
//! upsert and concurrent runs for the same country and day converge on one
//! row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use trendpulse_core::{day_label, NEWS_WEIGHT, VIDEO_WEIGHT};

use crate::DbError;

const BUCKET_COLUMNS: &str = "id, keyword, country, trend_volume, rank, collected_at, \
     video_count, news_count, social_count, composite_score";

/// A row from the `keyword_buckets` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct KeywordBucketRow {
    pub id: i64,
    pub keyword: String,
    pub country: String,
    pub trend_volume: i32,
    pub rank: i32,
    pub collected_at: DateTime<Utc>,
    pub video_count: i32,
    pub news_count: i32,
    pub social_count: i32,
    pub composite_score: f64,
}

/// Returns the bucket for `country` on `day`, creating it with zeroed
/// statistics if it does not exist yet.
///
/// `country` must already be normalized. Repeated calls for the same pair
/// return the same row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_bucket(
    pool: &PgPool,
    country: &str,
    day: NaiveDate,
) -> Result<KeywordBucketRow, DbError> {
    let keyword = day_label(country, day);

    // The no-op DO UPDATE makes RETURNING yield the existing row on conflict.
    let sql = format!(
        "INSERT INTO keyword_buckets (keyword, country, trend_volume, rank, collected_at) \
         VALUES ($1, $2, 0, 0, NOW()) \
         ON CONFLICT (keyword) DO UPDATE SET keyword = EXCLUDED.keyword \
         RETURNING {BUCKET_COLUMNS}"
    );

    let row = sqlx::query_as::<_, KeywordBucketRow>(&sql)
        .bind(&keyword)
        .bind(country)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Recounts the bucket's stored content and rewrites its counters and
/// composite score in one statement. Idempotent.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the bucket does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn recompute_statistics(
    pool: &PgPool,
    bucket_id: i64,
) -> Result<KeywordBucketRow, DbError> {
    let sql = format!(
        "WITH counts AS ( \
             SELECT \
                 (SELECT COUNT(*) FROM video_contents WHERE bucket_id = $1) AS videos, \
                 (SELECT COUNT(*) FROM news_contents WHERE bucket_id = $1) AS news, \
                 (SELECT COUNT(*) FROM social_contents WHERE bucket_id = $1) AS social \
         ) \
         UPDATE keyword_buckets \
         SET video_count = counts.videos::INTEGER, \
             news_count = counts.news::INTEGER, \
             social_count = counts.social::INTEGER, \
             composite_score = counts.videos * $2::DOUBLE PRECISION \
                             + counts.news * $3::DOUBLE PRECISION \
         FROM counts \
         WHERE keyword_buckets.id = $1 \
         RETURNING {}",
        qualified_columns("keyword_buckets")
    );

    let row = sqlx::query_as::<_, KeywordBucketRow>(&sql)
        .bind(bucket_id)
        .bind(VIDEO_WEIGHT)
        .bind(NEWS_WEIGHT)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Fetches a single bucket by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_bucket(pool: &PgPool, id: i64) -> Result<KeywordBucketRow, DbError> {
    let sql = format!("SELECT {BUCKET_COLUMNS} FROM keyword_buckets WHERE id = $1");

    sqlx::query_as::<_, KeywordBucketRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Lists the most recent buckets, optionally for one country.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_buckets(
    pool: &PgPool,
    country: Option<&str>,
    limit: i64,
) -> Result<Vec<KeywordBucketRow>, DbError> {
    let sql = format!(
        "SELECT {BUCKET_COLUMNS} FROM keyword_buckets \
         WHERE ($1::TEXT IS NULL OR country = $1) \
         ORDER BY collected_at DESC, id DESC \
         LIMIT $2"
    );

    let rows = sqlx::query_as::<_, KeywordBucketRow>(&sql)
        .bind(country)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

fn qualified_columns(table: &str) -> String {
    BUCKET_COLUMNS
        .split(',')
        .map(|col| format!("{table}.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_columns_prefixes_every_column() {
        let cols = qualified_columns("b");
        assert!(cols.starts_with("b.id, b.keyword"));
        assert!(cols.ends_with("b.composite_score"));
        assert_eq!(cols.matches("b.").count(), 10);
    }
}
