//! Stock transaction entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::TransactionType;
use sqlx::FromRow;
use std::str::FromStr;

/// Row of `stock_transactions` joined with item name and actor username.
#[derive(Debug, Clone, FromRow)]
pub struct StockTransactionEntity {
    pub id: i64,
    pub item_id: i64,
    pub item_name: Option<String>,
    pub transaction_type: String,
    pub quantity_change: i32,
    pub reason: Option<String>,
    pub performed_by: Option<i64>,
    pub performed_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StockTransactionEntity> for domain::models::StockTransaction {
    fn from(entity: StockTransactionEntity) -> Self {
        Self {
            id: entity.id,
            item_id: entity.item_id,
            item_name: entity.item_name,
            transaction_type: TransactionType::from_str(&entity.transaction_type)
                .unwrap_or(TransactionType::Add),
            quantity_change: entity.quantity_change,
            reason: entity.reason,
            performed_by: entity.performed_by,
            performed_by_username: entity.performed_by_username,
            created_at: entity.created_at,
        }
    }
}
