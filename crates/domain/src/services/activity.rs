//! Fluent construction of activity log entries.
//!
//! Route handlers build a [`CreateActivityLogInput`] with
//! [`ActivityLogBuilder`] and hand it to the recorder after the business
//! transaction has committed.

use crate::models::{ActivityAction, CreateActivityLogInput, EntityType};
use serde_json::Value as JsonValue;
use std::net::IpAddr;

/// Request-scoped details attached to every entry when available.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ActivityLogBuilder {
    user_id: Option<i64>,
    action: ActivityAction,
    entity_type: EntityType,
    entity_id: Option<i64>,
    old_values: Option<JsonValue>,
    new_values: Option<JsonValue>,
    context: RequestContext,
}

impl ActivityLogBuilder {
    /// Entry for an action performed by an authenticated user.
    pub fn user_action(user_id: i64, action: ActivityAction, entity_type: EntityType) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::anonymous(action, entity_type)
        }
    }

    /// Entry without an actor, e.g. startup bootstrap.
    pub fn anonymous(action: ActivityAction, entity_type: EntityType) -> Self {
        Self {
            user_id: None,
            action,
            entity_type,
            entity_id: None,
            old_values: None,
            new_values: None,
            context: RequestContext::default(),
        }
    }

    pub fn on_entity(mut self, entity_id: i64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    /// State before the change.
    pub fn with_old_values(mut self, values: JsonValue) -> Self {
        self.old_values = Some(values);
        self
    }

    /// State after the change.
    pub fn with_new_values(mut self, values: JsonValue) -> Self {
        self.new_values = Some(values);
        self
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    pub fn build(self) -> CreateActivityLogInput {
        CreateActivityLogInput {
            user_id: self.user_id,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            old_values: self.old_values,
            new_values: self.new_values,
            ip_address: self.context.ip_address,
            user_agent: self.context.user_agent,
            request_id: self.context.request_id,
        }
    }
}

/// Shorthands for the entries the API writes.
pub mod activity_helpers {
    use super::*;
    use serde_json::json;

    pub fn item_created(user_id: i64, item_id: i64, new_values: JsonValue) -> ActivityLogBuilder {
        ActivityLogBuilder::user_action(user_id, ActivityAction::Create, EntityType::Item)
            .on_entity(item_id)
            .with_new_values(new_values)
    }

    pub fn item_updated(
        user_id: i64,
        item_id: i64,
        old_values: JsonValue,
        new_values: JsonValue,
    ) -> ActivityLogBuilder {
        ActivityLogBuilder::user_action(user_id, ActivityAction::Update, EntityType::Item)
            .on_entity(item_id)
            .with_old_values(old_values)
            .with_new_values(new_values)
    }

    pub fn item_deleted(user_id: i64, item_id: i64, old_values: JsonValue) -> ActivityLogBuilder {
        ActivityLogBuilder::user_action(user_id, ActivityAction::Delete, EntityType::Item)
            .on_entity(item_id)
            .with_old_values(old_values)
    }

    pub fn category_created(
        user_id: i64,
        category_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> ActivityLogBuilder {
        ActivityLogBuilder::user_action(user_id, ActivityAction::Create, EntityType::Category)
            .on_entity(category_id)
            .with_new_values(json!({ "name": name, "description": description }))
    }

    /// `actor_id` is `None` when the account was created by bootstrap.
    pub fn user_created(
        actor_id: Option<i64>,
        new_user_id: i64,
        username: &str,
        role: &str,
    ) -> ActivityLogBuilder {
        let builder = match actor_id {
            Some(id) => ActivityLogBuilder::user_action(id, ActivityAction::Create, EntityType::User),
            None => ActivityLogBuilder::anonymous(ActivityAction::Create, EntityType::User),
        };
        builder
            .on_entity(new_user_id)
            .with_new_values(json!({ "username": username, "role": role }))
    }

    pub fn user_logged_in(user_id: i64) -> ActivityLogBuilder {
        ActivityLogBuilder::user_action(user_id, ActivityAction::Login, EntityType::User)
            .on_entity(user_id)
    }

    pub fn user_logged_out(user_id: i64) -> ActivityLogBuilder {
        ActivityLogBuilder::user_action(user_id, ActivityAction::Logout, EntityType::User)
            .on_entity(user_id)
    }
}
