//! Keyless YouTube search via the public Atom feed.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::{Client, Url};
use trendpulse_core::NormalizedVideo;

use crate::error::SourceError;
use crate::http::{build_client, get_text, join_url, parse_base_url, HttpSettings};
use crate::source::VideoSearchSource;
use crate::youtube::watch_url;

const DEFAULT_BASE_URL: &str = "https://www.youtube.com/";

/// Video search over `feeds/videos.xml?search_query=`. Used when no Data
/// API key is configured.
pub struct YouTubeFeedSearch {
    client: Client,
    settings: HttpSettings,
    base_url: Url,
}

impl YouTubeFeedSearch {
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
impl VideoSearchSource for YouTubeFeedSearch {
    fn name(&self) -> &'static str {
        "youtube_feed"
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<NormalizedVideo>, SourceError> {
        let mut url = join_url(&self.base_url, "feeds/videos.xml")?;
        url.query_pairs_mut().append_pair("search_query", query);

        let body = get_text(&self.client, &self.settings, &url).await?;
        let limit = usize::try_from(max_results).unwrap_or(usize::MAX);
        parse_video_feed(&body, limit)
    }
}

#[derive(Default)]
struct EntryDraft {
    video_id: String,
    title: String,
    author: Option<String>,
    published: Option<String>,
    link: Option<String>,
    views: Option<i64>,
}

impl EntryDraft {
    fn finish(self) -> Option<NormalizedVideo> {
        let video_id = if self.video_id.is_empty() {
            self.link.as_deref().and_then(video_id_from_link)?
        } else {
            self.video_id
        };
        if self.title.is_empty() {
            return None;
        }
        Some(NormalizedVideo {
            url: self.link.unwrap_or_else(|| watch_url(&video_id)),
            video_id,
            title: self.title,
            channel: self.author,
            views: self.views,
            likes: None,
            published_at: self.published,
        })
    }
}

/// Parse an Atom video feed, returning at most `limit` entries.
pub(crate) fn parse_video_feed(xml: &str, limit: usize) -> Result<Vec<NormalizedVideo>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut videos = Vec::new();
    let mut entry: Option<EntryDraft> = None;
    let mut in_author = false;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = tag_name(&e);
                match name.as_str() {
                    "entry" => entry = Some(EntryDraft::default()),
                    "author" => in_author = true,
                    _ => {}
                }
                if let Some(draft) = entry.as_mut() {
                    read_attributes(draft, &name, &e);
                }
                current_tag = name;
            }
            Ok(Event::Empty(e)) => {
                if let Some(draft) = entry.as_mut() {
                    read_attributes(draft, &tag_name(&e), &e);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(draft) = entry.as_mut() {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "yt:videoId" => draft.video_id = text,
                        "title" if !in_author => draft.title = text,
                        "name" if in_author => draft.author = Some(text),
                        "published" => draft.published = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                match name {
                    "author" => in_author = false,
                    "entry" => {
                        if let Some(video) = entry.take().and_then(EntryDraft::finish) {
                            videos.push(video);
                            if videos.len() >= limit {
                                break;
                            }
                        }
                    }
                    _ => {}
                }
                current_tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    Ok(videos)
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn read_attributes(draft: &mut EntryDraft, name: &str, e: &BytesStart<'_>) {
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(attr.value.as_ref()).into_owned();
        match (name, attr.key.as_ref()) {
            ("link", b"href") if value.contains("youtube.com/watch") => draft.link = Some(value),
            ("media:statistics", b"views") => draft.views = value.parse().ok(),
            _ => {}
        }
    }
}

fn video_id_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
}
