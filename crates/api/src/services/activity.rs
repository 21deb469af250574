//! Best-effort activity recording.
//!
//! Entries are written after the business transaction has committed. A
//! failed write is logged on the operator channel and counted, but never
//! reaches the caller.

use domain::services::ActivityLogBuilder;
use persistence::repositories::ActivityLogRepository;
use sqlx::PgPool;

use crate::middleware::metrics::record_activity_failure;

#[derive(Clone)]
pub struct ActivityRecorder {
    repo: ActivityLogRepository,
}

impl ActivityRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: ActivityLogRepository::new(pool),
        }
    }

    /// Appends one entry. Returns the new id, or `None` if the write failed.
    pub async fn record(&self, entry: ActivityLogBuilder) -> Option<i64> {
        let input = entry.build();

        match self.repo.insert(&input).await {
            Ok(id) => Some(id),
            Err(e) => {
                record_activity_failure();
                tracing::error!(
                    error = %e,
                    action = input.action.as_str(),
                    entity_type = input.entity_type.as_str(),
                    entity_id = ?input.entity_id,
                    user_id = ?input.user_id,
                    "Failed to record activity"
                );
                None
            }
        }
    }
}
