//! A collection run with an audit row in `collection_runs`.

use sqlx::PgPool;
use thiserror::Error;
use trendpulse_core::normalize_country;
use trendpulse_db::DbError;
use uuid::Uuid;

use crate::collector::{CollectError, CollectionSummary, TrendCollector};
use crate::store::TrendStore;

#[derive(Debug, Error)]
pub enum RecordedRunError {
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("collection run bookkeeping failed: {0}")]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordedCollection {
    pub run_id: i64,
    pub public_id: Uuid,
    pub summary: CollectionSummary,
}

/// Run `collector.collect(country)` inside a `collection_runs` row that
/// moves `queued → running → succeeded | failed`.
///
/// `trigger_source` is `cli`, `api` or `scheduler`.
///
/// # Errors
///
/// Returns [`RecordedRunError::Collect`] if the run itself fails (the row
/// is marked failed first), or [`RecordedRunError::Db`] if the run row
/// cannot be created or started. Once `collect` has succeeded the result is
/// `Ok` even if the row cannot be marked succeeded.
pub async fn run_recorded_collection<S: TrendStore>(
    pool: &PgPool,
    collector: &TrendCollector<S>,
    country: &str,
    trigger_source: &str,
) -> Result<RecordedCollection, RecordedRunError> {
    let country = normalize_country(country);
    if country.is_empty() {
        return Err(CollectError::EmptyCountry.into());
    }

    let run = trendpulse_db::create_collection_run(pool, &country, trigger_source).await?;
    trendpulse_db::start_collection_run(pool, run.id).await?;

    let summary = match collector.collect(&country).await {
        Ok(summary) => summary,
        Err(e) => {
            fail_run_best_effort(pool, run.id, &e.to_string()).await;
            return Err(e.into());
        }
    };

    // Content and statistics are already committed; the run row is bookkeeping.
    let records = i32::try_from(summary.item_count).unwrap_or(i32::MAX);
    if let Err(e) = trendpulse_db::complete_collection_run(pool, run.id, records).await {
        tracing::warn!(
            run_id = run.id,
            country = %country,
            error = %e,
            "failed to mark collection run as succeeded"
        );
    }

    Ok(RecordedCollection {
        run_id: run.id,
        public_id: run.public_id,
        summary,
    })
}

async fn fail_run_best_effort(pool: &PgPool, run_id: i64, message: &str) {
    if let Err(mark_err) = trendpulse_db::fail_collection_run(pool, run_id, message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark collection run as failed"
        );
    }
}
