//! Issue-board keywords rendered as news items.

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use trendpulse_core::{IssueKeyword, NormalizedNews};

/// `news_contents.source` label for synthesized items, distinct from the
/// feed label.
pub const ISSUE_NEWS_SOURCE: &str = "실시간 검색어";

/// One news item per keyword, rank 1 first.
///
/// Title is `"🔥 {keyword}"`; the URL is the keyword's own link or a web
/// search for it.
#[must_use]
pub fn issue_keywords_as_news(keywords: &[IssueKeyword], now: DateTime<Utc>) -> Vec<NormalizedNews> {
    let mut ranked: Vec<&IssueKeyword> = keywords.iter().collect();
    ranked.sort_by_key(|k| k.rank);

    let published = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    ranked
        .into_iter()
        .map(|k| NormalizedNews {
            title: format!("🔥 {}", k.keyword),
            source: ISSUE_NEWS_SOURCE.to_string(),
            description: String::new(),
            published_at: Some(published.clone()),
            url: k
                .url
                .clone()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| search_url(&k.keyword)),
        })
        .collect()
}

fn search_url(keyword: &str) -> String {
    let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC);
    format!("https://www.google.com/search?q={encoded}")
}
