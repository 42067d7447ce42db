//! Background jobs.

#[cfg(feature = "scheduler")]
mod scheduler;

#[cfg(feature = "scheduler")]
pub use scheduler::{Scheduler, schedule_reconciliation};

use std::sync::Arc;

use quill_core::services::ReconciliationService;

/// Every 15 minutes, at second 0.
pub const DEFAULT_RECONCILE_SCHEDULE: &str = "0 */15 * * * *";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
    /// Cron expression (with seconds) for the orphan reconciliation job.
    pub reconcile_schedule: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reconcile_schedule: DEFAULT_RECONCILE_SCHEDULE.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: crate::config::flag("SCHEDULER_ENABLED", true),
            reconcile_schedule: std::env::var("RECONCILE_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_RECONCILE_SCHEDULE.to_string()),
        }
    }
}

/// One reconciliation pass. Failures are logged, never propagated.
pub async fn reconcile(service: Arc<ReconciliationService>) {
    if let Err(e) = service.run().await {
        tracing::error!(error = %e, "Orphan reconciliation failed");
    }
}
