//! Adapter traits. Each content kind has one trait; the collector holds
//! them as `Arc<dyn ...>` so tests can script them.

use async_trait::async_trait;
use trendpulse_core::{IssueKeyword, NormalizedNews, NormalizedVideo};

use crate::error::SourceError;

#[async_trait]
pub trait TrendingVideoSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Currently popular videos for `country`, at most `max_results`.
    async fn fetch_trending(
        &self,
        country: &str,
        max_results: u32,
    ) -> Result<Vec<NormalizedVideo>, SourceError>;
}

#[async_trait]
pub trait VideoSearchSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, max_results: u32)
        -> Result<Vec<NormalizedVideo>, SourceError>;
}

#[async_trait]
pub trait NewsFeedSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Top stories for the country's news edition.
    async fn fetch(&self, country: &str) -> Result<Vec<NormalizedNews>, SourceError>;
}

/// A real-time keyword ranking.
#[async_trait]
pub trait IssueBoardSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Current ranking, rank 1 first.
    async fn fetch(&self) -> Result<Vec<IssueKeyword>, SourceError>;
}
