//! User repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{NewUser, Role};
use sqlx::{PgConnection, PgPool};

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, full_name, role, is_active,
    created_at, updated_at, last_login_at
"#;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Exact, case-sensitive username lookup. Inactive users are returned too.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_username");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(&self, user: &NewUser) -> Result<UserEntity, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert_user(&mut conn, user).await
    }

    pub async fn update_last_login(
        &self,
        user_id: i64,
        last_login_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_last_login");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(last_login_at)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn active_admin_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role = $1 AND is_active = TRUE)",
        )
        .bind(Role::Admin.as_str())
        .fetch_one(&self.pool)
        .await
    }
}

/// Inserts a user on an existing connection or transaction.
pub async fn insert_user(conn: &mut PgConnection, user: &NewUser) -> Result<UserEntity, sqlx::Error> {
    let timer = QueryTimer::new("create_user");
    let result = sqlx::query_as::<_, UserEntity>(&format!(
        r#"
        INSERT INTO users (username, email, password_hash, full_name, role, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.full_name)
    .bind(user.role.as_str())
    .fetch_one(conn)
    .await;
    timer.record();
    result
}
