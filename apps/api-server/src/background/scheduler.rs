//! Cron-style job scheduler using tokio-cron-scheduler.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use blogify_core::ports::ViewRecordRepository;

/// Every minute, on the minute.
pub const VIEW_PURGE_SCHEDULE: &str = "0 * * * * *";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Add a cron job.
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Drop view markers older than `window`, so a returning reader counts again.
    pub async fn add_view_purge(
        &self,
        views: Arc<dyn ViewRecordRepository>,
        window: TimeDelta,
    ) -> Result<uuid::Uuid, JobSchedulerError> {
        self.add_cron(VIEW_PURGE_SCHEDULE, move || {
            let views = views.clone();
            async move {
                match views.purge_expired(Utc::now() - window).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::debug!(removed, "Expired view records purged"),
                    Err(e) => tracing::warn!(error = %e, "View record purge failed"),
                }
            }
        })
        .await
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogify_core::domain::ViewRecord;
    use blogify_infra::InMemoryStore;

    #[tokio::test]
    async fn test_view_purge_job_registers() {
        let scheduler = Scheduler::new(SchedulerConfig { enabled: false }).await.unwrap();
        let store = Arc::new(InMemoryStore::new());

        let id = scheduler
            .add_view_purge(store, ViewRecord::default_window())
            .await
            .unwrap();

        assert!(!id.is_nil());
    }
}
