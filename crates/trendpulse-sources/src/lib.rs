//! External content sources for trendpulse.
//!
//! Each adapter talks to one public endpoint and returns normalized records.
//! The collector never calls an adapter directly; it goes through
//! [`fetch_guarded`], which turns errors and timeouts into a
//! [`SourceOutcome::Failed`] so one dead source cannot fail a run.

pub mod error;
pub(crate) mod html;
pub mod http;
pub mod outcome;
pub mod source;

pub mod google_news;
pub mod nate;
pub mod reddit;
pub mod signal_bz;
pub mod youtube;
pub mod youtube_feed;

use std::sync::Arc;

use trendpulse_core::IssueBoardKind;

pub use error::SourceError;
pub use google_news::GoogleNewsClient;
pub use http::HttpSettings;
pub use nate::NateClient;
pub use outcome::{fetch_guarded, SourceFailure, SourceOutcome};
pub use reddit::RedditPopularClient;
pub use signal_bz::SignalBzClient;
pub use source::{IssueBoardSource, NewsFeedSource, TrendingVideoSource, VideoSearchSource};
pub use youtube::YouTubeApiClient;
pub use youtube_feed::YouTubeFeedSearch;

/// Build the configured issue-board adapter.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
pub fn issue_board_for(
    kind: IssueBoardKind,
    settings: &HttpSettings,
) -> Result<Arc<dyn IssueBoardSource>, SourceError> {
    let board: Arc<dyn IssueBoardSource> = match kind {
        IssueBoardKind::SignalBz => Arc::new(SignalBzClient::new(settings)?),
        IssueBoardKind::Nate => Arc::new(NateClient::new(settings)?),
        IssueBoardKind::Reddit => Arc::new(RedditPopularClient::new(settings)?),
    };
    Ok(board)
}

/// Build the video search adapter: the Data API when a key is configured,
/// otherwise the keyless search feed.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
pub fn video_search_for(
    api_key: Option<&str>,
    settings: &HttpSettings,
) -> Result<Arc<dyn VideoSearchSource>, SourceError> {
    let search: Arc<dyn VideoSearchSource> = match api_key {
        Some(key) => Arc::new(YouTubeApiClient::new(settings, Some(key))?),
        None => Arc::new(YouTubeFeedSearch::new(settings)?),
    };
    Ok(search)
}
