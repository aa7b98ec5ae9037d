//! Background job scheduler.
//!
//! Registers one cron job that collects every configured country.

use std::sync::Arc;

use futures::future::join_all;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use trendpulse_collector::{run_recorded_collection, PgTrendStore, TrendCollector};

/// Builds and starts the scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot be started.
pub async fn build_scheduler(
    pool: PgPool,
    collector: Arc<TrendCollector<PgTrendStore>>,
    countries: Vec<String>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_collect_job(&scheduler, pool, collector, countries, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_collect_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    collector: Arc<TrendCollector<PgTrendStore>>,
    countries: Vec<String>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let countries = Arc::new(countries);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let collector = Arc::clone(&collector);
        let countries = Arc::clone(&countries);

        Box::pin(async move {
            tracing::info!(countries = countries.len(), "scheduler: starting trend collection");
            let failed = collect_all(&pool, &collector, &countries).await;
            tracing::info!(failed, "scheduler: trend collection complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered trend collection job");
    Ok(())
}

/// Collect every country concurrently. Returns how many runs failed.
async fn collect_all(
    pool: &PgPool,
    collector: &TrendCollector<PgTrendStore>,
    countries: &[String],
) -> usize {
    let runs = countries
        .iter()
        .map(|country| run_recorded_collection(pool, collector, country, "scheduler"));

    let mut failed = 0;
    for (country, result) in countries.iter().zip(join_all(runs).await) {
        match result {
            Ok(recorded) => tracing::info!(
                country = %recorded.summary.country,
                run_id = recorded.run_id,
                item_count = recorded.summary.item_count,
                "scheduler: country collected"
            ),
            Err(e) => {
                failed += 1;
                tracing::error!(country = %country, error = %e, "scheduler: collection failed");
            }
        }
    }
    failed
}
