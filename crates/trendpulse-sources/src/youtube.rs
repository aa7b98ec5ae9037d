//! YouTube Data API v3 client: most-popular chart and keyword search.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use trendpulse_core::NormalizedVideo;

use crate::error::SourceError;
use crate::http::{build_client, get_json, join_url, parse_base_url, HttpSettings};
use crate::source::{TrendingVideoSource, VideoSearchSource};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const SOURCE_NAME: &str = "youtube_api";
/// The API rejects `maxResults` above 50.
const API_MAX_RESULTS: u32 = 50;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ListResponse<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    channel_title: Option<String>,
    published_at: Option<String>,
}

/// Counters arrive as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the YouTube Data API.
///
/// Without an API key every call fails with [`SourceError::MissingApiKey`],
/// which the collector records as a source failure.
pub struct YouTubeApiClient {
    client: Client,
    settings: HttpSettings,
    api_key: Option<String>,
    base_url: Url,
}

impl YouTubeApiClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &HttpSettings, api_key: Option<&str>) -> Result<Self, SourceError> {
        Self::with_base_url(settings, api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built, or
    /// [`SourceError::InvalidConfig`] if `base_url` does not parse.
    pub fn with_base_url(
        settings: &HttpSettings,
        api_key: Option<&str>,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(settings)?,
            settings: settings.clone(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            base_url: parse_base_url(base_url)?,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, SourceError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingApiKey(SOURCE_NAME))?;

        let mut url = join_url(&self.base_url, path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
            pairs.append_pair("key", key);
        }
        Ok(url)
    }
}

#[async_trait]
impl TrendingVideoSource for YouTubeApiClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_trending(
        &self,
        country: &str,
        max_results: u32,
    ) -> Result<Vec<NormalizedVideo>, SourceError> {
        let max = max_results.min(API_MAX_RESULTS).to_string();
        let url = self.endpoint(
            "videos",
            &[
                ("part", "snippet,statistics"),
                ("chart", "mostPopular"),
                ("regionCode", country),
                ("maxResults", &max),
            ],
        )?;

        let response: ListResponse<VideoItem> =
            get_json(&self.client, &self.settings, &url, "videos.list").await?;
        let videos: Vec<_> = response.items.into_iter().map(normalize_video).collect();

        tracing::debug!(country, count = videos.len(), "fetched trending videos");
        Ok(videos)
    }
}

#[async_trait]
impl VideoSearchSource for YouTubeApiClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<NormalizedVideo>, SourceError> {
        let max = max_results.min(API_MAX_RESULTS).to_string();
        let url = self.endpoint(
            "search",
            &[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query),
                ("maxResults", &max),
            ],
        )?;

        let response: ListResponse<SearchItem> =
            get_json(&self.client, &self.settings, &url, "search.list").await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(normalize_search_item)
            .collect())
    }
}

fn normalize_video(item: VideoItem) -> NormalizedVideo {
    let (views, likes) = item.statistics.map_or((None, None), |s| {
        (parse_count(s.view_count), parse_count(s.like_count))
    });

    NormalizedVideo {
        url: watch_url(&item.id),
        video_id: item.id,
        title: item.snippet.title,
        channel: item.snippet.channel_title,
        views,
        likes,
        published_at: item.snippet.published_at,
    }
}

/// Search results carry no statistics; counters stay `None` so stored
/// values are not clobbered.
fn normalize_search_item(item: SearchItem) -> Option<NormalizedVideo> {
    let video_id = item.id.video_id?;
    Some(NormalizedVideo {
        url: watch_url(&video_id),
        video_id,
        title: item.snippet.title,
        channel: item.snippet.channel_title,
        views: None,
        likes: None,
        published_at: item.snippet.published_at,
    })
}

fn parse_count(raw: Option<String>) -> Option<i64> {
    raw.and_then(|s| s.parse::<i64>().ok())
}

pub(crate) fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
