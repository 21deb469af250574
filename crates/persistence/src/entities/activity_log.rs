//! Activity log entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `activity_logs` joined with the actor's username and full name.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogEntity {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    /// Selected as `ip_address::text`.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLogEntity> for domain::models::ActivityLog {
    fn from(entity: ActivityLogEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            username: entity.username,
            full_name: entity.full_name,
            action: entity.action,
            entity_type: entity.entity_type,
            entity_id: entity.entity_id,
            old_values: entity.old_values,
            new_values: entity.new_values,
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
            request_id: entity.request_id,
            created_at: entity.created_at,
        }
    }
}
