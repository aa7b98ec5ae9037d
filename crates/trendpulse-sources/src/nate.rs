//! Nate real-time issue keywords (`.isKeyword a` on the portal front page).

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use trendpulse_core::IssueKeyword;

use crate::error::SourceError;
use crate::html::text_lines;
use crate::http::{build_client, get_text, parse_base_url, HttpSettings};
use crate::source::IssueBoardSource;

const DEFAULT_BASE_URL: &str = "https://www.nate.com/";
const MIN_KEYWORD_CHARS: usize = 2;

pub struct NateClient {
    client: Client,
    settings: HttpSettings,
    base_url: Url,
}

impl NateClient {
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
impl IssueBoardSource for NateClient {
    fn name(&self) -> &'static str {
        "nate"
    }

    async fn fetch(&self) -> Result<Vec<IssueKeyword>, SourceError> {
        let body = get_text(&self.client, &self.settings, &self.base_url).await?;
        let keywords = parse_issue_keywords(&body);
        if keywords.is_empty() {
            tracing::warn!("nate page had no .isKeyword entries");
        }
        Ok(keywords)
    }
}

/// Extract keywords from anchors inside `.isKeyword` containers.
///
/// Anchor markup is typically `<span class="num">1</span><span>keyword</span>
/// <span>new</span>`; the keyword is the first text node that is not a rank
/// number or a badge. Keywords shorter than two characters and repeats are
/// dropped.
pub(crate) fn parse_issue_keywords(html: &str) -> Vec<IssueKeyword> {
    let container = Regex::new(r#"(?is)class\s*=\s*["'][^"']*\bisKeyword\b[^"']*["'][^>]*>"#)
        .expect("valid container regex");
    let anchor = Regex::new(r"(?is)<a\b[^>]*>(.*?)</a>").expect("valid anchor regex");
    let section_end = Regex::new(r"(?i)</(?:ul|ol|div)>").expect("valid section regex");

    let mut keywords: Vec<IssueKeyword> = Vec::new();
    for m in container.find_iter(html) {
        let rest = &html[m.end()..];
        let section = section_end
            .find(rest)
            .map_or(rest, |end| &rest[..end.start()]);

        for cap in anchor.captures_iter(section) {
            let Some(word) = text_lines(&cap[1]).into_iter().find(|l| !is_badge(l)) else {
                continue;
            };
            if word.chars().count() < MIN_KEYWORD_CHARS || keywords.iter().any(|k| k.keyword == word)
            {
                continue;
            }
            let rank = u32::try_from(keywords.len() + 1).unwrap_or(u32::MAX);
            keywords.push(IssueKeyword::new(word, rank));
        }
    }
    keywords
}

fn is_badge(line: &str) -> bool {
    line.chars().all(|c| c.is_ascii_digit()) || line.eq_ignore_ascii_case("new")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="area_hot">
          <ol class="isKeyword">
            <li><a href="/s?q=1"><span class="num">1</span><span class="txt_rank">단식 장동혁</span><span class="icon_new">new</span></a></li>
            <li><a href="/s?q=2"><span class="num">2</span><span class="txt_rank">이정후 LA</span></a></li>
            <li><a href="/s?q=3"><span class="num">3</span><span class="txt_rank">A</span></a></li>
            <li><a href="/s?q=4"><span class="num">4</span><span class="txt_rank">단식 장동혁</span></a></li>
          </ol>
        </div>
        <a href="/other">not a keyword</a>"#;

    #[test]
    fn extracts_keywords_skipping_rank_and_badge() {
        let keywords = parse_issue_keywords(PAGE);
        let words: Vec<_> = keywords.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(words, vec!["단식 장동혁", "이정후 LA"]);
        assert_eq!(keywords[1].rank, 2);
    }

    #[test]
    fn anchors_outside_container_are_ignored() {
        let keywords = parse_issue_keywords(PAGE);
        assert!(keywords.iter().all(|k| k.keyword != "not a keyword"));
    }

    #[test]
    fn plain_text_anchor_is_used_as_is() {
        let html = r##"<ul class="isKeyword"><li><a href="#">날씨</a></li></ul>"##;
        let keywords = parse_issue_keywords(html);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].keyword, "날씨");
    }
}
