//! Database operations for `social_contents`.
//!
//! Nothing collects social posts yet; the table is kept so bucket
//! statistics stay complete once a source exists.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use trendpulse_core::NormalizedSocialPost;

use crate::{DbError, UpsertAction, UpsertCounts};

/// A row from the `social_contents` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SocialContentRow {
    pub id: i64,
    pub bucket_id: i64,
    pub post_id: String,
    pub username: Option<String>,
    pub caption: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub posted_at: Option<String>,
    pub url: Option<String>,
    pub collected_at: DateTime<Utc>,
    pub country: Option<String>,
}

/// Inserts or refreshes one post keyed by `post_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn upsert_social_post(
    pool: &PgPool,
    bucket_id: i64,
    country: &str,
    post: &NormalizedSocialPost,
) -> Result<UpsertAction, DbError> {
    let inserted = sqlx::query_scalar::<_, bool>(
        "INSERT INTO social_contents \
             (bucket_id, country, post_id, username, caption, likes, comments, \
              posted_at, url, collected_at) \
         VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), COALESCE($7, 0), $8, $9, NOW()) \
         ON CONFLICT (post_id) DO UPDATE SET \
             bucket_id = EXCLUDED.bucket_id, \
             country = EXCLUDED.country, \
             username = COALESCE(EXCLUDED.username, social_contents.username), \
             caption = COALESCE(EXCLUDED.caption, social_contents.caption), \
             likes = COALESCE($6, social_contents.likes), \
             comments = COALESCE($7, social_contents.comments), \
             posted_at = COALESCE(EXCLUDED.posted_at, social_contents.posted_at), \
             url = COALESCE(EXCLUDED.url, social_contents.url), \
             collected_at = NOW() \
         RETURNING (xmax = 0) AS inserted",
    )
    .bind(bucket_id)
    .bind(country)
    .bind(&post.post_id)
    .bind(post.username.as_deref())
    .bind(post.caption.as_deref())
    .bind(post.likes)
    .bind(post.comments)
    .bind(post.posted_at.as_deref())
    .bind(post.url.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(UpsertAction::from_inserted_flag(inserted))
}

/// Upserts every post into `bucket_id`, skipping posts without an id.
pub async fn upsert_social_posts(
    pool: &PgPool,
    bucket_id: i64,
    country: &str,
    posts: &[NormalizedSocialPost],
) -> UpsertCounts {
    let mut counts = UpsertCounts::default();

    for post in posts {
        if !post.has_natural_key() {
            counts.skipped += 1;
            continue;
        }

        match upsert_social_post(pool, bucket_id, country, post).await {
            Ok(action) => counts.record(action),
            Err(e) => {
                tracing::warn!(
                    bucket_id,
                    post_id = %post.post_id,
                    error = %e,
                    "failed to upsert social post"
                );
                counts.failed += 1;
            }
        }
    }

    counts
}

/// Lists posts attached to a bucket.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_social_by_bucket(
    pool: &PgPool,
    bucket_id: i64,
    limit: i64,
) -> Result<Vec<SocialContentRow>, DbError> {
    let rows = sqlx::query_as::<_, SocialContentRow>(
        "SELECT id, bucket_id, post_id, username, caption, likes, comments, \
                posted_at, url, collected_at, country \
         FROM social_contents \
         WHERE bucket_id = $1 \
         ORDER BY likes DESC, id ASC \
         LIMIT $2",
    )
    .bind(bucket_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of posts attached to a bucket.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_social_by_bucket(pool: &PgPool, bucket_id: i64) -> Result<i64, DbError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM social_contents WHERE bucket_id = $1")
            .bind(bucket_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}
