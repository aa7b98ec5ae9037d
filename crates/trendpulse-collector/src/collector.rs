//! The collection run for one country.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use trendpulse_core::{normalize_country, AppConfig, IssueKeyword, NormalizedNews};
use trendpulse_db::DbError;
use trendpulse_sources::{
    fetch_guarded, issue_board_for, video_search_for, GoogleNewsClient, HttpSettings,
    IssueBoardSource, NewsFeedSource, SourceError, SourceFailure, TrendingVideoSource,
    VideoSearchSource, YouTubeApiClient,
};

use crate::issue_news::issue_keywords_as_news;
use crate::store::{PgTrendStore, TrendStore};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("country code must not be empty")]
    EmptyCountry,

    #[error("failed to resolve bucket for {country}: {source}")]
    BucketResolution {
        country: String,
        #[source]
        source: DbError,
    },
}

/// The four adapters a run draws from.
#[derive(Clone)]
pub struct CollectorSources {
    pub trending: Arc<dyn TrendingVideoSource>,
    pub search: Arc<dyn VideoSearchSource>,
    pub news: Arc<dyn NewsFeedSource>,
    pub issue_board: Arc<dyn IssueBoardSource>,
}

impl CollectorSources {
    /// Wire the production adapters from config.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let http = HttpSettings::from_app_config(config);
        let api_key = config.youtube_api_key.as_deref();

        Ok(Self {
            trending: Arc::new(YouTubeApiClient::new(&http, api_key)?),
            search: video_search_for(api_key, &http)?,
            news: Arc::new(GoogleNewsClient::new(&http)?),
            issue_board: issue_board_for(config.issue_board, &http)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Country whose runs use the issue board.
    pub primary_market: String,
    pub trending_max_results: u32,
    pub fallback_max_results: u32,
    /// Upper bound on any single adapter call.
    pub source_timeout: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            primary_market: "KR".to_string(),
            trending_max_results: 20,
            fallback_max_results: 10,
            source_timeout: Duration::from_secs(10),
        }
    }
}

impl CollectorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            primary_market: normalize_country(&config.primary_market),
            trending_max_results: config.trending_max_results,
            fallback_max_results: config.fallback_max_results,
            source_timeout: Duration::from_secs(config.source_timeout_secs),
        }
    }
}

/// What one run did.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub success: bool,
    pub message: String,
    pub country: String,
    pub bucket_id: i64,
    /// `video_items + news_items`.
    pub item_count: usize,
    /// Videos inserted or updated.
    pub video_items: usize,
    /// News items handed to storage, synthesized ones included.
    pub news_items: usize,
    pub used_video_fallback: bool,
    pub statistics_refreshed: bool,
    /// Bucket score after the recompute, when it succeeded.
    pub composite_score: Option<f64>,
    pub source_failures: Vec<SourceFailure>,
}

pub struct TrendCollector<S> {
    store: S,
    sources: CollectorSources,
    settings: CollectorSettings,
}

impl TrendCollector<PgTrendStore> {
    /// Production collector over Postgres.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if an adapter cannot be constructed.
    pub fn from_config(pool: PgPool, config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self::new(
            PgTrendStore::new(pool),
            CollectorSources::from_config(config)?,
            CollectorSettings::from_app_config(config),
        ))
    }
}

impl<S: TrendStore> TrendCollector<S> {
    pub fn new(store: S, sources: CollectorSources, settings: CollectorSettings) -> Self {
        Self {
            store,
            sources,
            settings,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Collect trending videos and news for `country` into today's bucket.
    ///
    /// Source failures never fail the run; they are listed in
    /// [`CollectionSummary::source_failures`].
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::EmptyCountry`] for a blank country code and
    /// [`CollectError::BucketResolution`] if the bucket cannot be resolved.
    pub async fn collect(&self, country: &str) -> Result<CollectionSummary, CollectError> {
        let country = normalize_country(country);
        if country.is_empty() {
            return Err(CollectError::EmptyCountry);
        }
        let is_primary = country == self.settings.primary_market;
        let mut failures = Vec::new();

        tracing::info!(country = %country, is_primary, "starting trend collection");

        let bucket = self
            .store
            .get_or_create_bucket(&country)
            .await
            .map_err(|source| CollectError::BucketResolution {
                country: country.clone(),
                source,
            })?;

        // Videos
        let mut videos = self.guard(
            self.sources.trending.name(),
            self.sources
                .trending
                .fetch_trending(&country, self.settings.trending_max_results),
            &mut failures,
        )
        .await;

        let mut used_video_fallback = false;
        if videos.is_empty() && is_primary {
            let keywords = self.fetch_issue_keywords(&mut failures).await;
            if let Some(top) = keywords.iter().min_by_key(|k| k.rank) {
                tracing::info!(country = %country, keyword = %top.keyword, "trending empty, searching top issue keyword");
                used_video_fallback = true;
                videos = self
                    .guard(
                        self.sources.search.name(),
                        self.sources
                            .search
                            .search(&top.keyword, self.settings.fallback_max_results),
                        &mut failures,
                    )
                    .await;
            }
        }

        let mut video_items = 0;
        if !videos.is_empty() {
            let counts = self.store.upsert_videos(bucket.id, &country, &videos).await;
            video_items = counts.processed();
            tracing::info!(
                country = %country,
                inserted = counts.inserted,
                updated = counts.updated,
                skipped = counts.skipped,
                failed = counts.failed,
                "videos stored"
            );
        }

        // News
        let mut news = self
            .guard(
                self.sources.news.name(),
                self.sources.news.fetch(&country),
                &mut failures,
            )
            .await;

        let now = Utc::now();
        if is_primary {
            let keywords = self.fetch_issue_keywords(&mut failures).await;
            if !keywords.is_empty() {
                let mut merged = issue_keywords_as_news(&keywords, now);
                merged.append(&mut news);
                news = merged;
            }
        }

        let mut news_items = 0;
        if !news.is_empty() {
            stamp_missing_published(&mut news, now);
            let counts = self.store.upsert_news(bucket.id, &country, &news).await;
            news_items = news.len();
            tracing::info!(
                country = %country,
                inserted = counts.inserted,
                updated = counts.updated,
                failed = counts.failed,
                "news stored"
            );
        }

        // Statistics
        let (statistics_refreshed, composite_score) =
            match self.store.recompute_statistics(bucket.id).await {
                Ok(row) => (true, Some(row.composite_score)),
                Err(e) => {
                    tracing::warn!(
                        country = %country,
                        bucket_id = bucket.id,
                        error = %e,
                        "failed to recompute bucket statistics"
                    );
                    (false, None)
                }
            };

        let item_count = video_items + news_items;
        tracing::info!(
            country = %country,
            bucket_id = bucket.id,
            item_count,
            source_failures = failures.len(),
            "trend collection finished"
        );

        Ok(CollectionSummary {
            success: true,
            message: format!("collected {item_count} items for {country}"),
            country,
            bucket_id: bucket.id,
            item_count,
            video_items,
            news_items,
            used_video_fallback,
            statistics_refreshed,
            composite_score,
            source_failures: failures,
        })
    }

    async fn fetch_issue_keywords(&self, failures: &mut Vec<SourceFailure>) -> Vec<IssueKeyword> {
        self.guard(
            self.sources.issue_board.name(),
            self.sources.issue_board.fetch(),
            failures,
        )
        .await
    }

    async fn guard<T, F>(&self, source: &str, fut: F, failures: &mut Vec<SourceFailure>) -> Vec<T>
    where
        F: std::future::Future<Output = Result<Vec<T>, SourceError>>,
    {
        let (value, failure) = fetch_guarded(source, self.settings.source_timeout, fut)
            .await
            .into_parts();
        failures.extend(failure);
        value
    }
}

/// Feed items without a publish date are stamped with the collection time.
fn stamp_missing_published(items: &mut [NormalizedNews], now: chrono::DateTime<Utc>) {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    for item in items.iter_mut().filter(|i| i.published_at.is_none()) {
        item.published_at = Some(stamp.clone());
    }
}
