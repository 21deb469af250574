//! User account and role models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

lazy_static::lazy_static! {
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

/// Role of a user account. Role is the only authorization axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    /// Returns true if this role satisfies a requirement set.
    ///
    /// Admin satisfies every requirement. Staff satisfies only sets that
    /// name staff explicitly.
    pub fn satisfies(&self, required: &[Role]) -> bool {
        match self {
            Role::Admin => true,
            Role::Staff => required.contains(&Role::Staff),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: Some(self.full_name.clone()),
            role: self.role,
        }
    }
}

/// Public view of a user returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: Role,
}

/// Request payload for logging in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Request payload for registering a new user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = "*USERNAME_REGEX",
            message = "Username may only contain letters, digits, '.', '_' and '-'"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"), length(max = 100))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be between 1 and 100 characters"))]
    pub full_name: String,

    pub role: Option<Role>,
}

/// Values for inserting a user once the password has been hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

impl NewUser {
    pub fn from_request(request: RegisterUserRequest, password_hash: String) -> Self {
        Self {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash,
            full_name: request.full_name.trim().to_string(),
            role: request.role.unwrap_or(Role::Staff),
        }
    }
}
