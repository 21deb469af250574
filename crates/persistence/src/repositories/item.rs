//! Item repository: filtered listing and transactional writes.
//!
//! Every write runs in one transaction that locks the item row, so the
//! stock transaction derived from a quantity change always matches the
//! committed quantities.

use domain::models::{
    ItemFilterClause, ItemSort, ItemValues, StockDelta, UpdateItemRequest, INITIAL_STOCK_REASON,
    STOCK_ADJUSTMENT_REASON,
};
use shared::pagination::PageRequest;
use shared::validation::contains_pattern;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use crate::entities::ItemEntity;
use crate::metrics::QueryTimer;
use crate::repositories::stock_transaction::insert_delta;

const ITEM_SELECT: &str = r#"
    SELECT i.id, i.item_name, i.category_id, c.name AS category_name, i.description,
           i.quantity, i.unit_price, i.total_value, i.reorder_level, i.location, i.barcode,
           i.created_by, i.updated_by, i.created_at, i.updated_at, i.is_active
    FROM items i
    LEFT JOIN categories c ON c.id = i.category_id
"#;

/// Failure of an item write.
#[derive(Debug, Error)]
pub enum ItemWriteError {
    #[error("Item not found")]
    NotFound,

    #[error("Category {0} does not exist")]
    UnknownCategory(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Result of a committed update.
#[derive(Debug, Clone)]
pub struct ItemUpdateOutcome {
    pub before: ItemEntity,
    pub after: ItemEntity,
    pub delta: Option<StockDelta>,
}

#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of items matching `clauses`, plus the total match count.
    pub async fn list(
        &self,
        clauses: &[ItemFilterClause],
        sort: ItemSort,
        page: PageRequest,
    ) -> Result<(Vec<ItemEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_items");

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM items i");
        push_filters(&mut count_query, clauses);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut list_query = QueryBuilder::<Postgres>::new(ITEM_SELECT);
        push_filters(&mut list_query, clauses);
        push_order(&mut list_query, sort);
        list_query
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = list_query
            .build_query_as::<ItemEntity>()
            .fetch_all(&self.pool)
            .await?;

        timer.record();
        Ok((items, total))
    }

    /// Fetches an item unless it is missing or soft-deleted.
    pub async fn find_active(&self, id: i64) -> Result<Option<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_item_by_id");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            "{} WHERE i.id = $1 AND i.is_active = TRUE",
            ITEM_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All active items for export, in listing order.
    pub async fn list_active(&self) -> Result<Vec<ItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_items");
        let result = sqlx::query_as::<_, ItemEntity>(&format!(
            "{} WHERE i.is_active = TRUE ORDER BY i.item_name ASC, i.id ASC",
            ITEM_SELECT
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Inserts an item and its initial stock transaction atomically.
    pub async fn create(
        &self,
        values: &ItemValues,
        actor_id: i64,
    ) -> Result<ItemEntity, ItemWriteError> {
        let timer = QueryTimer::new("create_item");
        let mut tx = self.pool.begin().await?;

        ensure_category(&mut tx, values.category_id).await?;

        let item_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO items (
                item_name, category_id, description, quantity, unit_price,
                reorder_level, location, barcode, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(&values.item_name)
        .bind(values.category_id)
        .bind(&values.description)
        .bind(values.quantity)
        .bind(values.unit_price)
        .bind(values.reorder_level)
        .bind(&values.location)
        .bind(&values.barcode)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(delta) = StockDelta::initial(values.quantity) {
            insert_delta(&mut tx, item_id, delta, INITIAL_STOCK_REASON, actor_id).await?;
        }

        let created = fetch_by_id(&mut tx, item_id).await?;
        tx.commit().await?;

        timer.record();
        Ok(created)
    }

    /// Applies a partial update. A quantity change writes a matching stock
    /// transaction in the same transaction.
    pub async fn update(
        &self,
        id: i64,
        changes: &UpdateItemRequest,
        actor_id: i64,
    ) -> Result<ItemUpdateOutcome, ItemWriteError> {
        let timer = QueryTimer::new("update_item");
        let mut tx = self.pool.begin().await?;

        let before = lock_active(&mut tx, id).await?.ok_or(ItemWriteError::NotFound)?;
        let current = ItemValues::from(&domain::models::Item::from(before.clone()));
        let merged = changes.merge(&current);

        if merged.category_id != current.category_id {
            ensure_category(&mut tx, merged.category_id).await?;
        }

        sqlx::query(
            r#"
            UPDATE items
            SET item_name = $2, category_id = $3, description = $4, quantity = $5,
                unit_price = $6, reorder_level = $7, location = $8, barcode = $9,
                updated_by = $10, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&merged.item_name)
        .bind(merged.category_id)
        .bind(&merged.description)
        .bind(merged.quantity)
        .bind(merged.unit_price)
        .bind(merged.reorder_level)
        .bind(&merged.location)
        .bind(&merged.barcode)
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;

        let delta = StockDelta::between(current.quantity, merged.quantity);
        if let Some(delta) = delta {
            insert_delta(&mut tx, id, delta, STOCK_ADJUSTMENT_REASON, actor_id).await?;
        }

        let after = fetch_by_id(&mut tx, id).await?;
        tx.commit().await?;

        timer.record();
        Ok(ItemUpdateOutcome {
            before,
            after,
            delta,
        })
    }

    /// Marks an item inactive and returns its last state.
    pub async fn soft_delete(&self, id: i64, actor_id: i64) -> Result<ItemEntity, ItemWriteError> {
        let timer = QueryTimer::new("delete_item");
        let mut tx = self.pool.begin().await?;

        let before = lock_active(&mut tx, id).await?.ok_or(ItemWriteError::NotFound)?;

        sqlx::query(
            r#"
            UPDATE items
            SET is_active = FALSE, updated_by = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        timer.record();
        Ok(before)
    }
}

async fn ensure_category(conn: &mut PgConnection, category_id: i64) -> Result<(), ItemWriteError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
        .bind(category_id)
        .fetch_one(conn)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(ItemWriteError::UnknownCategory(category_id))
    }
}

async fn lock_active(conn: &mut PgConnection, id: i64) -> Result<Option<ItemEntity>, sqlx::Error> {
    sqlx::query_as::<_, ItemEntity>(&format!(
        "{} WHERE i.id = $1 AND i.is_active = TRUE FOR UPDATE OF i",
        ITEM_SELECT
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

async fn fetch_by_id(conn: &mut PgConnection, id: i64) -> Result<ItemEntity, sqlx::Error> {
    sqlx::query_as::<_, ItemEntity>(&format!("{} WHERE i.id = $1", ITEM_SELECT))
        .bind(id)
        .fetch_one(conn)
        .await
}

/// Appends `WHERE ... AND ...` for the clauses, binding every user value.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, clauses: &[ItemFilterClause]) {
    for (index, clause) in clauses.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });

        match clause {
            ItemFilterClause::ActiveOnly => {
                builder.push("i.is_active = TRUE");
            }
            ItemFilterClause::Search(term) => {
                let pattern = contains_pattern(term);
                builder
                    .push("(i.item_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR i.description ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR i.barcode ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            ItemFilterClause::Category(category_id) => {
                builder.push("i.category_id = ").push_bind(*category_id);
            }
        }
    }
}

/// Column and direction come from closed enums; `i.id` breaks ties.
fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort: ItemSort) {
    builder
        .push(" ORDER BY ")
        .push(sort.field.column())
        .push(" ")
        .push(sort.order.as_sql())
        .push(", i.id ASC");
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{SortField, SortOrder};

    fn where_sql(clauses: &[ItemFilterClause]) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM items i");
        push_filters(&mut builder, clauses);
        builder.sql().to_string()
    }

    #[test]
    fn test_active_only() {
        assert_eq!(
            where_sql(&[ItemFilterClause::ActiveOnly]),
            "SELECT COUNT(*) FROM items i WHERE i.is_active = TRUE"
        );
    }

    #[test]
    fn test_all_clauses_bind_values() {
        let sql = where_sql(&[
            ItemFilterClause::ActiveOnly,
            ItemFilterClause::Search("x'; DROP TABLE items; --".to_string()),
            ItemFilterClause::Category(3),
        ]);
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM items i WHERE i.is_active = TRUE AND \
             (i.item_name ILIKE $1 OR i.description ILIKE $2 OR i.barcode ILIKE $3) \
             AND i.category_id = $4"
        );
        assert!(!sql.contains("DROP"));
    }

    #[test]
    fn test_order_default() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM items i");
        push_order(&mut builder, ItemSort::default());
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM items i ORDER BY i.item_name ASC, i.id ASC"
        );
    }

    #[test]
    fn test_order_custom() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM items i");
        push_order(
            &mut builder,
            ItemSort {
                field: SortField::TotalValue,
                order: SortOrder::Desc,
            },
        );
        assert!(builder.sql().ends_with("ORDER BY i.total_value DESC, i.id ASC"));
    }
}
