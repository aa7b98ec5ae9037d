//! Reddit `r/popular` daily top posts as global trend keywords.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use trendpulse_core::IssueKeyword;

use crate::error::SourceError;
use crate::http::{build_client, get_json, join_url, parse_base_url, HttpSettings};
use crate::source::IssueBoardSource;

const DEFAULT_BASE_URL: &str = "https://www.reddit.com/";
const PAGE_LIMIT: &str = "25";
/// Longer titles read as sentences rather than search keywords.
const MAX_TITLE_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    permalink: Option<String>,
}

pub struct RedditPopularClient {
    client: Client,
    settings: HttpSettings,
    base_url: Url,
}

impl RedditPopularClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &HttpSettings) -> Result<Self, SourceError> {
        Self::with_base_url(settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built, or
    /// [`SourceError::InvalidConfig`] if `base_url` does not parse.
    pub fn with_base_url(settings: &HttpSettings, base_url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(settings)?,
            settings: settings.clone(),
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl IssueBoardSource for RedditPopularClient {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn fetch(&self) -> Result<Vec<IssueKeyword>, SourceError> {
        let mut url = join_url(&self.base_url, "r/popular/top.json")?;
        url.query_pairs_mut()
            .append_pair("limit", PAGE_LIMIT)
            .append_pair("t", "day");

        let listing: Listing =
            get_json(&self.client, &self.settings, &url, "r/popular/top").await?;
        Ok(keywords_from_listing(listing))
    }
}

fn keywords_from_listing(listing: Listing) -> Vec<IssueKeyword> {
    let mut keywords = Vec::new();
    for post in listing.data.children {
        let Some(title) = post.data.title.map(|t| t.trim().to_string()) else {
            continue;
        };
        if title.is_empty() || title.chars().count() >= MAX_TITLE_CHARS {
            continue;
        }
        let rank = u32::try_from(keywords.len() + 1).unwrap_or(u32::MAX);
        let mut keyword = IssueKeyword::new(title, rank);
        keyword.url = post
            .data
            .permalink
            .map(|p| format!("https://www.reddit.com{p}"));
        keywords.push(keyword);
    }
    keywords
}
