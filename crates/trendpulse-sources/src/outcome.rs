//! The adapter boundary: every source call ends in a [`SourceOutcome`].

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::error::SourceError;

/// One source that could not deliver during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Result of one guarded source call.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Fetched(T),
    Failed(SourceFailure),
}

impl<T: Default> SourceOutcome<T> {
    /// Split into the value (empty on failure) and the failure, if any.
    pub fn into_parts(self) -> (T, Option<SourceFailure>) {
        match self {
            SourceOutcome::Fetched(value) => (value, None),
            SourceOutcome::Failed(failure) => (T::default(), Some(failure)),
        }
    }
}

/// Await `fut` for at most `timeout`. Errors and timeouts are logged and
/// returned as [`SourceOutcome::Failed`]; the caller never sees a
/// [`SourceError`].
pub async fn fetch_guarded<T, F>(source: &str, timeout: Duration, fut: F) -> SourceOutcome<T>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let reason = match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => return SourceOutcome::Fetched(value),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {}s", timeout.as_secs_f32()),
    };

    tracing::warn!(source, reason = %reason, "source unavailable, continuing without it");
    SourceOutcome::Failed(SourceFailure {
        source: source.to_string(),
        reason,
    })
}
