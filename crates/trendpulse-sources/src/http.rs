//! Shared HTTP plumbing: client construction, status checks and retry with
//! exponential back-off.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use trendpulse_core::AppConfig;

use crate::error::SourceError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const CONNECT_TIMEOUT_SECS: u64 = 5;
const MAX_DELAY_MS: u64 = 30_000;

/// Per-adapter HTTP behavior.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Extra attempts after the first try on a transient error.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 1,
            backoff_base_ms: 1_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.source_timeout_secs,
            max_retries: config.source_max_retries,
            backoff_base_ms: config.source_backoff_base_secs.saturating_mul(1_000),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Build a `reqwest::Client` with the configured timeout and user agent.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the client cannot be constructed.
pub fn build_client(settings: &HttpSettings) -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(settings.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Parse a base URL, normalizing it to end with exactly one slash so that
/// `Url::join` appends rather than replaces the last segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, SourceError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised)
        .map_err(|e| SourceError::InvalidConfig(format!("invalid base URL '{raw}': {e}")))
}

pub(crate) fn join_url(base: &Url, path: &str) -> Result<Url, SourceError> {
    base.join(path)
        .map_err(|e| SourceError::InvalidConfig(format!("cannot join '{path}' onto {base}: {e}")))
}

/// GET `url` and return the body text, retrying transient failures.
pub(crate) async fn get_text(
    client: &Client,
    settings: &HttpSettings,
    url: &Url,
) -> Result<String, SourceError> {
    retry_with_backoff(settings.max_retries, settings.backoff_base_ms, || async {
        let response = client.get(url.clone()).send().await?;
        check_status(response.status(), url)?;
        Ok(response.text().await?)
    })
    .await
}

/// GET `url` and deserialize the JSON body, retrying transient failures.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    settings: &HttpSettings,
    url: &Url,
    context: &str,
) -> Result<T, SourceError> {
    let body = get_text(client, settings, url).await?;
    serde_json::from_str(&body).map_err(|source| SourceError::Deserialize {
        context: context.to_string(),
        source,
    })
}

fn check_status(status: StatusCode, url: &Url) -> Result<(), SourceError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited {
            url: redact_key(url),
        });
    }
    if !status.is_success() {
        return Err(SourceError::UnexpectedStatus {
            status: status.as_u16(),
            url: redact_key(url),
        });
    }
    Ok(())
}

/// Drop the query string so API keys never reach logs or error messages.
fn redact_key(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The delay before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 %
/// jitter, capped at 30 s. Non-retriable errors return immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient source error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn base_url_gets_single_trailing_slash() {
        let url = parse_base_url("http://127.0.0.1:9000//").expect("valid");
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/");
        let joined = join_url(&url, "rss").expect("join");
        assert_eq!(joined.as_str(), "http://127.0.0.1:9000/rss");
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let err = parse_base_url("not a url").expect_err("invalid");
        assert!(matches!(err, SourceError::InvalidConfig(_)));
    }

    #[test]
    fn redact_key_strips_query() {
        let url = Url::parse("https://api.example/videos?key=secret&x=1").expect("valid");
        assert_eq!(redact_key(&url), "https://api.example/videos");
    }

    #[tokio::test]
    async fn retries_transient_error_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 2 {
                    Err(SourceError::UnexpectedStatus {
                        status: 502,
                        url: "u".to_string(),
                    })
                } else {
                    Ok(7_u32)
                }
            }
        })
        .await;

        assert_eq!(result.expect("eventually ok"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(SourceError::UnexpectedStatus {
                    status: 404,
                    url: "u".to_string(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(1, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(SourceError::RateLimited {
                    url: "u".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(SourceError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
