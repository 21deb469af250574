//! Activity log domain models.
//!
//! Every mutating action appends one immutable entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use shared::pagination::deserialize_optional_i64;
use std::net::IpAddr;
use std::str::FromStr;

/// Recorded actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "CREATE",
            ActivityAction::Update => "UPDATE",
            ActivityAction::Delete => "DELETE",
            ActivityAction::Login => "LOGIN",
            ActivityAction::Logout => "LOGOUT",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREATE" => Ok(ActivityAction::Create),
            "UPDATE" => Ok(ActivityAction::Update),
            "DELETE" => Ok(ActivityAction::Delete),
            "LOGIN" => Ok(ActivityAction::Login),
            "LOGOUT" => Ok(ActivityAction::Logout),
            _ => Err(format!("Unknown activity action: {}", s)),
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kinds of entity an activity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    User,
    Category,
    Item,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Category => "category",
            EntityType::Item => "item",
        }
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(EntityType::User),
            "category" => Ok(EntityType::Category),
            "item" => Ok(EntityType::Item),
            _ => Err(format!("Unknown entity type: {}", s)),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Activity log entry joined with the actor's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an activity entry.
#[derive(Debug, Clone)]
pub struct CreateActivityLogInput {
    pub user_id: Option<i64>,
    pub action: ActivityAction,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

/// Query parameters for listing activity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActivityLogsQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// A blank or non-numeric value means "any user".
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub user_id: Option<i64>,
    pub action: Option<String>,
}

/// Default page size for the activity listing.
pub const ACTIVITY_DEFAULT_LIMIT: i64 = 20;

/// Resolved activity listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityLogFilter {
    pub user_id: Option<i64>,
    pub action: Option<ActivityAction>,
}

impl ListActivityLogsQuery {
    pub fn filter(&self) -> Result<ActivityLogFilter, String> {
        let action = match self.action.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<ActivityAction>()?),
        };

        Ok(ActivityLogFilter {
            user_id: self.user_id,
            action,
        })
    }
}
