//! Signal.bz real-time search keyword board.

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use trendpulse_core::IssueKeyword;

use crate::error::SourceError;
use crate::html::strip_tags;
use crate::http::{build_client, get_text, parse_base_url, HttpSettings};
use crate::source::IssueBoardSource;

const DEFAULT_BASE_URL: &str = "https://www.signal.bz/";

pub struct SignalBzClient {
    client: Client,
    settings: HttpSettings,
    base_url: Url,
}

impl SignalBzClient {
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
impl IssueBoardSource for SignalBzClient {
    fn name(&self) -> &'static str {
        "signal_bz"
    }

    async fn fetch(&self) -> Result<Vec<IssueKeyword>, SourceError> {
        let body = get_text(&self.client, &self.settings, &self.base_url).await?;
        let keywords = parse_rank_list(&body);
        if keywords.is_empty() {
            tracing::warn!("signal.bz page had no .rank-text entries");
        }
        Ok(keywords)
    }
}

/// Extract the `.rank-text` entries in page order.
pub(crate) fn parse_rank_list(html: &str) -> Vec<IssueKeyword> {
    let re = Regex::new(r#"(?is)<[a-z0-9]+[^>]*class\s*=\s*["'][^"']*\brank-text\b[^"']*["'][^>]*>(.*?)</"#)
        .expect("valid rank-text regex");

    let mut keywords: Vec<IssueKeyword> = Vec::new();
    for cap in re.captures_iter(html) {
        let text = strip_tags(&cap[1]);
        if text.is_empty() || keywords.iter().any(|k| k.keyword == text) {
            continue;
        }
        let rank = u32::try_from(keywords.len() + 1).unwrap_or(u32::MAX);
        keywords.push(IssueKeyword::new(text, rank));
    }
    keywords
}
