//! Background dataset refresh.
//!
//! A repeated job ticks every `reload_poll` and reloads the store once
//! `reload_interval` has passed since the previous reload. The reload itself
//! runs on the blocking pool so a slow source never stalls request handlers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use foodtrucks_core::AppConfig;
use foodtrucks_engine::{DatasetStore, LoadOutcome};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle. Call `shutdown` on it when
/// the process stops.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    store: Arc<DatasetStore>,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_reload_job(
        &scheduler,
        store,
        config.reload_poll(),
        config.reload_interval(),
    )
    .await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_reload_job(
    scheduler: &JobScheduler,
    store: Arc<DatasetStore>,
    poll: Duration,
    interval: Duration,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_repeated_async(poll, move |_uuid, _lock| {
        let store = Arc::clone(&store);

        Box::pin(async move {
            run_reload_job(store, interval).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        poll_secs = poll.as_secs(),
        interval_secs = interval.as_secs(),
        "scheduler: registered dataset reload job"
    );
    Ok(())
}

/// Reloads the store if it is due. Returns `None` when nothing ran.
async fn run_reload_job(store: Arc<DatasetStore>, interval: Duration) -> Option<LoadOutcome> {
    if !store.due_for_reload(Utc::now(), interval) {
        return None;
    }

    let outcome = match tokio::task::spawn_blocking(move || store.reload()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: reload task failed to complete");
            return None;
        }
    };

    match &outcome {
        LoadOutcome::Loaded {
            records,
            dropped_rows,
        } => {
            tracing::debug!(records, dropped = dropped_rows, "scheduler: reload complete");
        }
        LoadOutcome::SourceUnavailable { reason } => {
            tracing::warn!(reason = %reason, "scheduler: reload failed; retrying after the next interval");
        }
        LoadOutcome::Skipped => {
            tracing::debug!("scheduler: reload already running; tick skipped");
        }
    }
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use foodtrucks_engine::MemorySource;

    use super::*;

    fn store_with_one_record() -> Arc<DatasetStore> {
        let row = HashMap::from([
            ("locationid".to_string(), "1".to_string()),
            ("Applicant".to_string(), "Taco A".to_string()),
            ("Status".to_string(), "APPROVED".to_string()),
        ]);
        Arc::new(DatasetStore::new(MemorySource::new(vec![row])))
    }

    #[tokio::test]
    async fn reload_job_runs_when_due_then_waits_for_interval() {
        let store = store_with_one_record();
        let interval = Duration::from_secs(60);

        let first = run_reload_job(Arc::clone(&store), interval).await;
        assert!(matches!(first, Some(LoadOutcome::Loaded { records: 1, .. })));
        assert!(store.is_available());

        let second = run_reload_job(Arc::clone(&store), interval).await;
        assert!(second.is_none(), "reload should wait a full interval");
    }

    #[tokio::test]
    async fn failed_reload_still_waits_for_interval() {
        let store = Arc::new(DatasetStore::new(MemorySource::unavailable("offline")));
        let interval = Duration::from_secs(60);

        let first = run_reload_job(Arc::clone(&store), interval).await;
        assert!(matches!(first, Some(LoadOutcome::SourceUnavailable { .. })));
        assert!(run_reload_job(Arc::clone(&store), interval).await.is_none());
        assert!(!store.is_available());
    }
}
