//! Postgres persistence for trend buckets, collected content and run
//! bookkeeping. Everything is a free function over `&PgPool`; the pool is
//! owned by the binary that calls [`connect_pool`].

use thiserror::Error;

pub mod collection_runs;
pub mod keyword_buckets;
pub mod news_contents;
pub mod pool;
pub mod social_contents;
pub mod upsert;
pub mod video_contents;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("record not found")]
    NotFound,
    #[error("collection run {id} is not in '{expected_status}' status")]
    InvalidCollectionRunTransition {
        id: i64,
        expected_status: &'static str,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub use collection_runs::{
    complete_collection_run, create_collection_run, fail_collection_run, get_collection_run,
    list_collection_runs, start_collection_run, CollectionRunRow,
};
pub use keyword_buckets::{
    get_bucket, get_or_create_bucket, list_buckets, recompute_statistics, KeywordBucketRow,
};
pub use news_contents::{
    count_news_by_bucket, list_news_by_bucket, upsert_news, upsert_news_item, NewsContentRow,
};
pub use pool::{
    connect_pool, connect_pool_from_env, health_check, ping, run_migrations, PoolConfig,
};
pub use social_contents::{
    count_social_by_bucket, list_social_by_bucket, upsert_social_post, upsert_social_posts,
    SocialContentRow,
};
pub use upsert::{UpsertAction, UpsertCounts};
pub use video_contents::{
    count_videos_by_bucket, list_videos_by_bucket, upsert_video, upsert_videos, VideoContentRow,
};
