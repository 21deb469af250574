//! Creates the first admin account on startup.
//!
//! Runs after migrations. Does nothing unless a bootstrap username and
//! password are configured, and nothing once an active admin exists.

use domain::models::{NewUser, Role};
use domain::services::activity_helpers;
use persistence::repositories::UserRepository;
use shared::password::{hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;
use crate::services::activity::ActivityRecorder;

/// Shortest bootstrap password accepted, matching registration.
const MIN_BOOTSTRAP_PASSWORD_LEN: usize = 8;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// Why bootstrap did or did not create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    WeakPassword,
    AdminExists,
    Created { user_id: i64 },
}

/// Idempotent: safe to call on every start.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    let username = config.bootstrap_username.trim();
    if username.is_empty() {
        return Ok(BootstrapOutcome::NotConfigured);
    }

    if config.bootstrap_password.len() < MIN_BOOTSTRAP_PASSWORD_LEN {
        warn!(
            "INV__ADMIN__BOOTSTRAP_USERNAME is set but the bootstrap password is missing or \
             shorter than {} characters - skipping bootstrap",
            MIN_BOOTSTRAP_PASSWORD_LEN
        );
        return Ok(BootstrapOutcome::WeakPassword);
    }

    let users = UserRepository::new(pool.clone());
    if users.active_admin_exists().await? {
        info!("Active admin already exists - skipping bootstrap");
        return Ok(BootstrapOutcome::AdminExists);
    }

    let email = if config.bootstrap_email.trim().is_empty() {
        format!("{}@localhost", username)
    } else {
        config.bootstrap_email.trim().to_lowercase()
    };

    let new_user = NewUser {
        username: username.to_string(),
        email,
        password_hash: hash_password(&config.bootstrap_password)?,
        full_name: "System Administrator".to_string(),
        role: Role::Admin,
    };

    let created = users.create(&new_user).await?;

    ActivityRecorder::new(pool.clone())
        .record(activity_helpers::user_created(
            None,
            created.id,
            &created.username,
            Role::Admin.as_str(),
        ))
        .await;

    info!(
        username = %created.username,
        user_id = created.id,
        "Bootstrap admin user created"
    );
    warn!(
        "SECURITY: remove INV__ADMIN__BOOTSTRAP_PASSWORD from the configuration after initial setup"
    );

    Ok(BootstrapOutcome::Created {
        user_id: created.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // connect_lazy never touches the network, so the early exits are testable
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://nobody@localhost:1/none")
            .unwrap()
    }

    #[tokio::test]
    async fn test_not_configured() {
        let outcome = bootstrap_admin(&lazy_pool(), &AdminBootstrapConfig::default())
            .await
            .unwrap();
        assert_eq!(outcome, BootstrapOutcome::NotConfigured);
    }

    #[tokio::test]
    async fn test_short_password_skipped() {
        let config = AdminBootstrapConfig {
            bootstrap_username: "admin".to_string(),
            bootstrap_email: String::new(),
            bootstrap_password: "short".to_string(),
        };
        let outcome = bootstrap_admin(&lazy_pool(), &config).await.unwrap();
        assert_eq!(outcome, BootstrapOutcome::WeakPassword);
    }
}
