use serde::{Deserialize, Serialize};

/// A video returned by a trending or search source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVideo {
    /// Platform video identifier; the natural key of the video kind.
    pub video_id: String,
    pub title: String,
    pub channel: Option<String>,
    /// `None` when the source does not report counters (e.g. search results).
    pub views: Option<i64>,
    pub likes: Option<i64>,
    /// Publish timestamp exactly as the source reported it.
    pub published_at: Option<String>,
    pub url: String,
}

impl NormalizedVideo {
    /// Returns `true` if the item carries a usable natural key.
    #[must_use]
    pub fn has_natural_key(&self) -> bool {
        !self.video_id.trim().is_empty()
    }
}

/// A news article from a feed, or a keyword synthesized into news shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedNews {
    pub title: String,
    /// Feed label, e.g. `"Google News"`.
    pub source: String,
    pub description: String,
    pub published_at: Option<String>,
    /// Article URL; the natural key of the news kind. May be empty.
    pub url: String,
}

/// An image/social post. Same shape as the other kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSocialPost {
    pub post_id: String,
    pub username: Option<String>,
    pub caption: Option<String>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub posted_at: Option<String>,
    pub url: Option<String>,
}

impl NormalizedSocialPost {
    #[must_use]
    pub fn has_natural_key(&self) -> bool {
        !self.post_id.trim().is_empty()
    }
}

/// One entry of a real-time issue board ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueKeyword {
    pub keyword: String,
    /// 1-based position on the board; 1 is the hottest keyword.
    pub rank: u32,
    /// Direct link published by the board, if any.
    pub url: Option<String>,
}

impl IssueKeyword {
    #[must_use]
    pub fn new(keyword: impl Into<String>, rank: u32) -> Self {
        Self {
            keyword: keyword.into(),
            rank,
            url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_video_id_has_no_natural_key() {
        let video = NormalizedVideo {
            video_id: "  ".to_string(),
            title: "t".to_string(),
            channel: None,
            views: None,
            likes: None,
            published_at: None,
            url: String::new(),
        };
        assert!(!video.has_natural_key());
    }
}
