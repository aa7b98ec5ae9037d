//! Database operations for `video_contents`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use trendpulse_core::NormalizedVideo;

use crate::{DbError, UpsertAction, UpsertCounts};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `video_contents` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VideoContentRow {
    pub id: i64,
    pub bucket_id: i64,
    pub video_id: String,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub published_at: Option<String>,
    pub url: Option<String>,
    pub collected_at: DateTime<Utc>,
    pub country: Option<String>,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts or refreshes one video keyed by `video_id`.
///
/// On conflict the row is re-attached to `bucket_id` and its descriptive
/// fields are overwritten. Counters the source did not report (`None`)
/// keep their stored values.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails (e.g. a value exceeds a
/// column limit).
pub async fn upsert_video(
    pool: &PgPool,
    bucket_id: i64,
    country: &str,
    video: &NormalizedVideo,
) -> Result<UpsertAction, DbError> {
    let inserted = sqlx::query_scalar::<_, bool>(
        "INSERT INTO video_contents \
             (bucket_id, country, video_id, title, channel, views, likes, \
              published_at, url, collected_at) \
         VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), COALESCE($7, 0), $8, $9, NOW()) \
         ON CONFLICT (video_id) DO UPDATE SET \
             bucket_id = EXCLUDED.bucket_id, \
             country = EXCLUDED.country, \
             title = EXCLUDED.title, \
             channel = COALESCE(EXCLUDED.channel, video_contents.channel), \
             views = COALESCE($6, video_contents.views), \
             likes = COALESCE($7, video_contents.likes), \
             published_at = COALESCE(EXCLUDED.published_at, video_contents.published_at), \
             url = EXCLUDED.url, \
             collected_at = NOW() \
         RETURNING (xmax = 0) AS inserted",
    )
    .bind(bucket_id)
    .bind(country)
    .bind(&video.video_id)
    .bind(&video.title)
    .bind(video.channel.as_deref())
    .bind(video.views)
    .bind(video.likes)
    .bind(video.published_at.as_deref())
    .bind(&video.url)
    .fetch_one(pool)
    .await?;

    Ok(UpsertAction::from_inserted_flag(inserted))
}

/// Upserts every video into `bucket_id`, item by item.
///
/// Items without a `video_id` are skipped. A failed item is logged and
/// counted; the remaining items are still attempted.
pub async fn upsert_videos(
    pool: &PgPool,
    bucket_id: i64,
    country: &str,
    videos: &[NormalizedVideo],
) -> UpsertCounts {
    let mut counts = UpsertCounts::default();

    for video in videos {
        if !video.has_natural_key() {
            tracing::debug!(bucket_id, title = %video.title, "skipping video without id");
            counts.skipped += 1;
            continue;
        }

        match upsert_video(pool, bucket_id, country, video).await {
            Ok(action) => counts.record(action),
            Err(e) => {
                tracing::warn!(
                    bucket_id,
                    video_id = %video.video_id,
                    error = %e,
                    "failed to upsert video"
                );
                counts.failed += 1;
            }
        }
    }

    counts
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Lists videos attached to a bucket, most-viewed first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_videos_by_bucket(
    pool: &PgPool,
    bucket_id: i64,
    limit: i64,
) -> Result<Vec<VideoContentRow>, DbError> {
    let rows = sqlx::query_as::<_, VideoContentRow>(
        "SELECT id, bucket_id, video_id, title, channel, views, likes, \
                published_at, url, collected_at, country \
         FROM video_contents \
         WHERE bucket_id = $1 \
         ORDER BY views DESC, id ASC \
         LIMIT $2",
    )
    .bind(bucket_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of videos attached to a bucket.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_videos_by_bucket(pool: &PgPool, bucket_id: i64) -> Result<i64, DbError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM video_contents WHERE bucket_id = $1")
            .bind(bucket_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}
