use thiserror::Error;

/// Errors returned by source adapters.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered 429.
    #[error("rate limited by {url}")]
    RateLimited { url: String },

    /// Any other non-2xx status.
    #[error("unexpected HTTP {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The feed body is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The adapter needs an API key that is not configured.
    #[error("{0} requires an API key")]
    MissingApiKey(&'static str),

    /// A base URL or other adapter setting is malformed.
    #[error("invalid source configuration: {0}")]
    InvalidConfig(String),
}

impl SourceError {
    /// Returns `true` for errors that are worth retrying after a back-off.
    ///
    /// Network failures, 429 and 5xx are transient. Everything else would
    /// fail the same way again.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            SourceError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            SourceError::RateLimited { .. } => true,
            SourceError::UnexpectedStatus { status, .. } => *status >= 500,
            SourceError::Xml(_)
            | SourceError::Deserialize { .. }
            | SourceError::MissingApiKey(_)
            | SourceError::InvalidConfig(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        let url = "http://example".to_string();
        assert!(SourceError::RateLimited { url: url.clone() }.is_retriable());
        assert!(SourceError::UnexpectedStatus {
            status: 503,
            url: url.clone()
        }
        .is_retriable());
        assert!(!SourceError::UnexpectedStatus { status: 404, url }.is_retriable());
    }

    #[test]
    fn missing_key_is_not_retriable() {
        assert!(!SourceError::MissingApiKey("youtube_api").is_retriable());
    }
}
