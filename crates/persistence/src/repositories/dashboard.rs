//! Dashboard aggregation queries.
//!
//! Nothing is cached: each call recomputes over the current active items.

use domain::models::{CategoryDistribution, DashboardSummary, RECENT_TRANSACTIONS_LIMIT};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use crate::metrics::QueryTimer;
use crate::repositories::stock_transaction::StockTransactionRepository;

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

struct ItemTotals {
    total_items: i64,
    total_value: Decimal,
    low_stock_count: i64,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, sqlx::Error> {
        let timer = QueryTimer::new("dashboard_summary");
        let transactions = StockTransactionRepository::new(self.pool.clone());

        // Independent reads; run them concurrently
        let (totals, distribution, recent) = tokio::try_join!(
            self.get_item_totals(),
            self.get_category_distribution(),
            transactions.recent(RECENT_TRANSACTIONS_LIMIT),
        )?;
        timer.record();

        Ok(DashboardSummary {
            total_items: totals.total_items,
            total_value: totals.total_value,
            low_stock_count: totals.low_stock_count,
            category_distribution: distribution,
            recent_transactions: recent.into_iter().map(Into::into).collect(),
        })
    }

    async fn get_item_totals(&self) -> Result<ItemTotals, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_items,
                COALESCE(SUM(total_value), 0) AS total_value,
                COUNT(*) FILTER (WHERE quantity <= reorder_level) AS low_stock_count
            FROM items
            WHERE is_active = TRUE
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ItemTotals {
            total_items: row.try_get("total_items")?,
            total_value: row.try_get("total_value")?,
            low_stock_count: row.try_get("low_stock_count")?,
        })
    }

    /// Every category, including empty ones, by item count then name.
    async fn get_category_distribution(&self) -> Result<Vec<CategoryDistribution>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.id AS category_id,
                c.name AS category_name,
                COUNT(i.id) AS item_count,
                COALESCE(SUM(i.total_value), 0) AS total_value
            FROM categories c
            LEFT JOIN items i ON i.category_id = c.id AND i.is_active = TRUE
            GROUP BY c.id, c.name
            ORDER BY item_count DESC, c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok::<_, sqlx::Error>(CategoryDistribution {
                    category_id: row.try_get("category_id")?,
                    category_name: row.try_get("category_name")?,
                    item_count: row.try_get("item_count")?,
                    total_value: row.try_get("total_value")?,
                })
            })
            .collect()
    }
}
