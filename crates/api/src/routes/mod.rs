//! HTTP route handlers.

pub mod auth;
pub mod categories;
pub mod health;
pub mod inventory;
pub mod reports;

use serde::Serialize;

/// `{ "success": true, "message": ... }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
