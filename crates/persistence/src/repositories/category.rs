//! Category repository.

use sqlx::PgPool;

use crate::entities::CategoryEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by name.
    pub async fn list(&self) -> Result<Vec<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_categories");
        let result = sqlx::query_as::<_, CategoryEntity>(
            r#"
            SELECT id, name, description, created_at
            FROM categories
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<CategoryEntity>, sqlx::Error> {
        sqlx::query_as::<_, CategoryEntity>(
            "SELECT id, name, description, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Inserts a category. A duplicate name surfaces as a unique violation.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CategoryEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_category");
        let result = sqlx::query_as::<_, CategoryEntity>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
