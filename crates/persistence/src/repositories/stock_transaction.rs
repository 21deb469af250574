//! Stock transaction repository.
//!
//! Rows are only inserted from inside the item write transactions; this
//! repository exposes reads plus the insert helper those transactions use.

use domain::models::StockDelta;
use shared::pagination::PageRequest;
use sqlx::{PgConnection, PgPool};

use crate::entities::StockTransactionEntity;
use crate::metrics::QueryTimer;

const TRANSACTION_SELECT: &str = r#"
    SELECT st.id, st.item_id, i.item_name, st.transaction_type, st.quantity_change,
           st.reason, st.performed_by, u.username AS performed_by_username, st.created_at
    FROM stock_transactions st
    JOIN items i ON i.id = st.item_id
    LEFT JOIN users u ON u.id = st.performed_by
"#;

#[derive(Clone)]
pub struct StockTransactionRepository {
    pool: PgPool,
}

impl StockTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Transactions of one item, newest first.
    pub async fn list_for_item(
        &self,
        item_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<StockTransactionEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_item_transactions");

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_transactions WHERE item_id = $1")
                .bind(item_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, StockTransactionEntity>(&format!(
            r#"
            {}
            WHERE st.item_id = $1
            ORDER BY st.created_at DESC, st.id DESC
            LIMIT $2 OFFSET $3
            "#,
            TRANSACTION_SELECT
        ))
        .bind(item_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        timer.record();
        Ok((rows, total))
    }

    /// Most recent transactions across all items.
    pub async fn recent(&self, limit: i64) -> Result<Vec<StockTransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recent_transactions");
        let result = sqlx::query_as::<_, StockTransactionEntity>(&format!(
            r#"
            {}
            ORDER BY st.created_at DESC, st.id DESC
            LIMIT $1
            "#,
            TRANSACTION_SELECT
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Records a stock movement on the caller's transaction.
pub async fn insert_delta(
    conn: &mut PgConnection,
    item_id: i64,
    delta: StockDelta,
    reason: &str,
    performed_by: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO stock_transactions
            (item_id, transaction_type, quantity_change, reason, performed_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(item_id)
    .bind(delta.transaction_type.as_str())
    .bind(delta.quantity_change)
    .bind(reason)
    .bind(performed_by)
    .fetch_one(conn)
    .await
}
