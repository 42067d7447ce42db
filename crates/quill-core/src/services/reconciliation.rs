use std::sync::Arc;

use crate::error::DomainError;
use crate::ports::{MaintenanceRepository, OrphanReport};

/// Removes rows that reference users or posts which no longer exist.
///
/// Runs as a scheduled job; read paths never clean up.
pub struct ReconciliationService {
    maintenance: Arc<dyn MaintenanceRepository>,
}

impl ReconciliationService {
    pub fn new(maintenance: Arc<dyn MaintenanceRepository>) -> Self {
        Self { maintenance }
    }

    pub async fn run(&self) -> Result<OrphanReport, DomainError> {
        let report = self.maintenance.purge_orphans().await?;

        if report.is_empty() {
            tracing::debug!("Reconciliation found no orphaned rows");
        } else {
            tracing::info!(
                posts_removed = report.posts_removed,
                likes_removed = report.likes_removed,
                "Orphaned rows removed"
            );
        }

        Ok(report)
    }
}
