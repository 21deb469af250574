//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Role;
use sqlx::FromRow;
use std::str::FromStr;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            password_hash: entity.password_hash,
            full_name: entity.full_name,
            // The CHECK constraint makes other values unreachable; fall back to least privilege
            role: Role::from_str(&entity.role).unwrap_or(Role::Staff),
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_login_at: entity.last_login_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(role: &str) -> UserEntity {
        UserEntity {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            full_name: "Admin".to_string(),
            role: role.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_role_mapping() {
        let user: domain::models::User = entity("admin").into();
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_unknown_role_maps_to_staff() {
        let user: domain::models::User = entity("superuser").into();
        assert_eq!(user.role, Role::Staff);
    }
}
