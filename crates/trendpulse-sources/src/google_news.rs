//! Google News top-stories RSS per country edition.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{Client, Url};
use trendpulse_core::{news_locale, NormalizedNews};

use crate::error::SourceError;
use crate::html::strip_tags;
use crate::http::{build_client, get_text, join_url, parse_base_url, HttpSettings};
use crate::source::NewsFeedSource;

const DEFAULT_BASE_URL: &str = "https://news.google.com/";
/// Label stored in `news_contents.source` for feed articles.
pub const GOOGLE_NEWS_LABEL: &str = "Google News";
const MAX_ITEMS: usize = 30;

pub struct GoogleNewsClient {
    client: Client,
    settings: HttpSettings,
    base_url: Url,
}

impl GoogleNewsClient {
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
impl NewsFeedSource for GoogleNewsClient {
    fn name(&self) -> &'static str {
        "google_news"
    }

    async fn fetch(&self, country: &str) -> Result<Vec<NormalizedNews>, SourceError> {
        let locale = news_locale(country);
        let mut url = join_url(&self.base_url, "rss")?;
        url.query_pairs_mut()
            .append_pair("hl", &locale.hl)
            .append_pair("gl", &locale.gl)
            .append_pair("ceid", &locale.ceid);

        let body = get_text(&self.client, &self.settings, &url).await?;
        let items = parse_news_feed(&body, MAX_ITEMS)?;

        tracing::debug!(country, count = items.len(), "fetched news feed");
        Ok(items)
    }
}

/// Parse an RSS 2.0 feed into news items.
///
/// Items without a title are dropped. A missing link yields an empty URL.
pub(crate) fn parse_news_feed(xml: &str, limit: usize) -> Result<Vec<NormalizedNews>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut link = String::new();
    let mut description = String::new();
    let mut pub_date: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" {
                    in_item = true;
                    title.clear();
                    link.clear();
                    description.clear();
                    pub_date = None;
                }
                current_tag = name;
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(&current_tag, text, &mut title, &mut link, &mut description, &mut pub_date);
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(&current_tag, text, &mut title, &mut link, &mut description, &mut pub_date);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" && in_item {
                    in_item = false;
                    if !title.is_empty() {
                        items.push(NormalizedNews {
                            title: title.clone(),
                            source: GOOGLE_NEWS_LABEL.to_string(),
                            description: strip_tags(&description),
                            published_at: pub_date.take(),
                            url: link.clone(),
                        });
                        if items.len() >= limit {
                            break;
                        }
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    Ok(items)
}

fn assign_field(
    tag: &str,
    text: String,
    title: &mut String,
    link: &mut String,
    description: &mut String,
    pub_date: &mut Option<String>,
) {
    match tag {
        "title" => *title = text,
        "link" => *link = text,
        "description" => description.push_str(&text),
        "pubDate" => *pub_date = Some(text),
        _ => {}
    }
}
