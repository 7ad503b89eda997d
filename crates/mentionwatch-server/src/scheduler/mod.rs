//! Background job scheduler.
//!
//! Runs one monitoring cycle eagerly at startup, then on a fixed interval.
//! Each cycle is recorded in `monitor_runs`.

use std::sync::Arc;
use std::time::Duration;

use mentionwatch_core::TrackedBrand;
use mentionwatch_db::MonitorRunCounts;
use mentionwatch_monitor::{CycleReport, Monitor};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    monitor: Arc<Monitor>,
    brands: Arc<[TrackedBrand]>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_monitor_job(
        &scheduler,
        pool.clone(),
        Arc::clone(&monitor),
        Arc::clone(&brands),
        interval,
    )
    .await?;

    scheduler.start().await?;

    tokio::spawn(async move {
        run_monitor_job(&pool, monitor, brands, "startup").await;
    });

    Ok(scheduler)
}

/// Register the repeating monitor cycle. Cycles may overlap; the mention
/// table's unique key keeps concurrent admits safe.
async fn register_monitor_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    monitor: Arc<Monitor>,
    brands: Arc<[TrackedBrand]>,
    interval: Duration,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let monitor = Arc::clone(&monitor);
        let brands = Arc::clone(&brands);

        Box::pin(async move {
            run_monitor_job(&pool, monitor, brands, "scheduled").await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_secs = interval.as_secs(),
        "scheduler: monitor job registered"
    );
    Ok(())
}

/// Run one cycle with `monitor_runs` bookkeeping. Bookkeeping failures are
/// logged and never stop the cycle itself.
async fn run_monitor_job(
    pool: &PgPool,
    monitor: Arc<Monitor>,
    brands: Arc<[TrackedBrand]>,
    trigger_source: &str,
) {
    let run_id = begin_run(pool, trigger_source).await;
    tracing::info!(
        trigger_source,
        brands = brands.len(),
        "scheduler: starting monitor cycle"
    );

    // Spawned so a panic inside the cycle is caught and recorded as a failed run.
    let cycle = tokio::spawn(async move { monitor.run_cycle(&brands).await });

    match cycle.await {
        Ok(report) => {
            tracing::info!(
                trigger_source,
                admitted = report.admitted(),
                spikes = report.spikes(),
                "scheduler: monitor cycle complete"
            );
            if let Some(id) = run_id {
                if let Err(e) =
                    mentionwatch_db::complete_monitor_run(pool, id, run_counts(&report)).await
                {
                    tracing::error!(run_id = id, error = %e, "scheduler: failed to complete run");
                }
            }
        }
        Err(e) => {
            tracing::error!(trigger_source, error = %e, "scheduler: monitor cycle aborted");
            if let Some(id) = run_id {
                if let Err(e) = mentionwatch_db::fail_monitor_run(pool, id, &e.to_string()).await {
                    tracing::error!(run_id = id, error = %e, "scheduler: failed to mark run failed");
                }
            }
        }
    }
}

/// Create and start a run row. `None` when bookkeeping is unavailable.
async fn begin_run(pool: &PgPool, trigger_source: &str) -> Option<i64> {
    let run = match mentionwatch_db::create_monitor_run(pool, trigger_source).await {
        Ok(run) => run,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to create monitor run");
            return None;
        }
    };

    if let Err(e) = mentionwatch_db::start_monitor_run(pool, run.id).await {
        tracing::error!(run_id = run.id, error = %e, "scheduler: failed to start monitor run");
        return None;
    }

    Some(run.id)
}

fn run_counts(report: &CycleReport) -> MonitorRunCounts {
    let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    MonitorRunCounts {
        brands_processed: clamp(report.brands.len()),
        mentions_persisted: clamp(report.admitted()),
        alerts_raised: clamp(report.spikes()),
    }
}

#[cfg(test)]
mod tests {
    use mentionwatch_monitor::BrandReport;

    use super::*;

    #[test]
    fn run_counts_sum_brand_reports() {
        let report = CycleReport {
            brands: vec![
                BrandReport {
                    brand: "Tesla".to_string(),
                    admitted: 4,
                    spike: true,
                    ..BrandReport::default()
                },
                BrandReport {
                    brand: "Apple".to_string(),
                    admitted: 2,
                    duplicates: 7,
                    ..BrandReport::default()
                },
            ],
        };

        let counts = run_counts(&report);
        assert_eq!(counts.brands_processed, 2);
        assert_eq!(counts.mentions_persisted, 6);
        assert_eq!(counts.alerts_raised, 1);
    }

    #[test]
    fn run_counts_of_empty_cycle_are_zero() {
        assert_eq!(
            run_counts(&CycleReport::default()),
            MonitorRunCounts::default()
        );
    }
}
