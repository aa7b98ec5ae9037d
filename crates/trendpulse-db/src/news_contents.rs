//! Database operations for `news_contents`.
//!
//! The natural key is `url`, enforced by a partial unique index that
//! ignores empty URLs. Items with an empty URL never conflict and are
//! stored as new rows on every run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use trendpulse_core::NormalizedNews;

use crate::{DbError, UpsertAction, UpsertCounts};

/// A row from the `news_contents` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NewsContentRow {
    pub id: i64,
    pub bucket_id: i64,
    pub title: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub url: String,
    pub collected_at: DateTime<Utc>,
    pub country: Option<String>,
}

/// Inserts or refreshes one news item keyed by `url`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn upsert_news_item(
    pool: &PgPool,
    bucket_id: i64,
    country: &str,
    item: &NormalizedNews,
) -> Result<UpsertAction, DbError> {
    let inserted = sqlx::query_scalar::<_, bool>(
        "INSERT INTO news_contents \
             (bucket_id, country, title, source, description, published_at, url, collected_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) \
         ON CONFLICT (url) WHERE url <> '' DO UPDATE SET \
             bucket_id = EXCLUDED.bucket_id, \
             country = EXCLUDED.country, \
             title = EXCLUDED.title, \
             source = EXCLUDED.source, \
             description = EXCLUDED.description, \
             published_at = COALESCE(EXCLUDED.published_at, news_contents.published_at), \
             collected_at = NOW() \
         RETURNING (xmax = 0) AS inserted",
    )
    .bind(bucket_id)
    .bind(country)
    .bind(&item.title)
    .bind(&item.source)
    .bind(&item.description)
    .bind(item.published_at.as_deref())
    .bind(item.url.trim())
    .fetch_one(pool)
    .await?;

    Ok(UpsertAction::from_inserted_flag(inserted))
}

/// Upserts every news item into `bucket_id`, item by item.
///
/// News has no skip case: an empty URL is a valid, key-less item.
pub async fn upsert_news(
    pool: &PgPool,
    bucket_id: i64,
    country: &str,
    items: &[NormalizedNews],
) -> UpsertCounts {
    let mut counts = UpsertCounts::default();

    for item in items {
        match upsert_news_item(pool, bucket_id, country, item).await {
            Ok(action) => counts.record(action),
            Err(e) => {
                tracing::warn!(
                    bucket_id,
                    url = %item.url,
                    error = %e,
                    "failed to upsert news item"
                );
                counts.failed += 1;
            }
        }
    }

    counts
}

/// Lists news attached to a bucket in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_news_by_bucket(
    pool: &PgPool,
    bucket_id: i64,
    limit: i64,
) -> Result<Vec<NewsContentRow>, DbError> {
    let rows = sqlx::query_as::<_, NewsContentRow>(
        "SELECT id, bucket_id, title, source, description, published_at, url, \
                collected_at, country \
         FROM news_contents \
         WHERE bucket_id = $1 \
         ORDER BY id ASC \
         LIMIT $2",
    )
    .bind(bucket_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of news items attached to a bucket.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_news_by_bucket(pool: &PgPool, bucket_id: i64) -> Result<i64, DbError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news_contents WHERE bucket_id = $1")
            .bind(bucket_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}
