//! Persistence seam used by the collector.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use sqlx::PgPool;
use trendpulse_core::{NormalizedNews, NormalizedVideo};
use trendpulse_db::{DbError, KeywordBucketRow, UpsertCounts};

#[async_trait]
pub trait TrendStore: Send + Sync {
    /// Today's bucket for an already-normalized country code.
    async fn get_or_create_bucket(&self, country: &str) -> Result<KeywordBucketRow, DbError>;

    async fn upsert_videos(
        &self,
        bucket_id: i64,
        country: &str,
        videos: &[NormalizedVideo],
    ) -> UpsertCounts;

    async fn upsert_news(
        &self,
        bucket_id: i64,
        country: &str,
        items: &[NormalizedNews],
    ) -> UpsertCounts;

    async fn recompute_statistics(&self, bucket_id: i64) -> Result<KeywordBucketRow, DbError>;
}

#[async_trait]
impl<T: TrendStore + ?Sized> TrendStore for Arc<T> {
    async fn get_or_create_bucket(&self, country: &str) -> Result<KeywordBucketRow, DbError> {
        (**self).get_or_create_bucket(country).await
    }

    async fn upsert_videos(
        &self,
        bucket_id: i64,
        country: &str,
        videos: &[NormalizedVideo],
    ) -> UpsertCounts {
        (**self).upsert_videos(bucket_id, country, videos).await
    }

    async fn upsert_news(
        &self,
        bucket_id: i64,
        country: &str,
        items: &[NormalizedNews],
    ) -> UpsertCounts {
        (**self).upsert_news(bucket_id, country, items).await
    }

    async fn recompute_statistics(&self, bucket_id: i64) -> Result<KeywordBucketRow, DbError> {
        (**self).recompute_statistics(bucket_id).await
    }
}

/// [`TrendStore`] over Postgres.
#[derive(Clone)]
pub struct PgTrendStore {
    pool: PgPool,
}

impl PgTrendStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TrendStore for PgTrendStore {
    async fn get_or_create_bucket(&self, country: &str) -> Result<KeywordBucketRow, DbError> {
        // Day boundaries follow the host's local calendar.
        let today = Local::now().date_naive();
        trendpulse_db::get_or_create_bucket(&self.pool, country, today).await
    }

    async fn upsert_videos(
        &self,
        bucket_id: i64,
        country: &str,
        videos: &[NormalizedVideo],
    ) -> UpsertCounts {
        trendpulse_db::upsert_videos(&self.pool, bucket_id, country, videos).await
    }

    async fn upsert_news(
        &self,
        bucket_id: i64,
        country: &str,
        items: &[NormalizedNews],
    ) -> UpsertCounts {
        trendpulse_db::upsert_news(&self.pool, bucket_id, country, items).await
    }

    async fn recompute_statistics(&self, bucket_id: i64) -> Result<KeywordBucketRow, DbError> {
        trendpulse_db::recompute_statistics(&self.pool, bucket_id).await
    }
}
