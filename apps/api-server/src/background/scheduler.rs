//! Cron-style job scheduler using tokio-cron-scheduler.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use quill_core::services::ReconciliationService;

use super::SchedulerConfig;

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Add a cron job.
    ///
    /// # Example
    /// ```ignore
    /// scheduler.add_cron("0 0 * * * *", || async {
    ///     tracing::info!("Running hourly job");
    /// }).await?;
    /// ```
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

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// Register the orphan reconciliation job on the configured schedule.
pub async fn schedule_reconciliation(
    scheduler: &Scheduler,
    service: Arc<ReconciliationService>,
) -> Result<uuid::Uuid, JobSchedulerError> {
    let schedule = scheduler.config().reconcile_schedule.clone();
    scheduler
        .add_cron(&schedule, move || super::reconcile(service.clone()))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_infra::InMemoryStore;

    #[tokio::test]
    async fn test_reconciliation_job_registers() {
        let service = Arc::new(ReconciliationService::new(Arc::new(InMemoryStore::new())));
        let scheduler = Scheduler::new(SchedulerConfig::default()).await.unwrap();

        assert!(schedule_reconciliation(&scheduler, service).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_schedule_is_rejected() {
        let service = Arc::new(ReconciliationService::new(Arc::new(InMemoryStore::new())));
        let config = SchedulerConfig {
            enabled: true,
            reconcile_schedule: "not a cron line".to_string(),
        };
        let scheduler = Scheduler::new(config).await.unwrap();

        assert!(schedule_reconciliation(&scheduler, service).await.is_err());
    }
}
