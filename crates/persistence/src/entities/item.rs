//! Item entity (database row mapping).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Row of `items` joined with `categories.name`.
#[derive(Debug, Clone, FromRow)]
pub struct ItemEntity {
    pub id: i64,
    pub item_name: String,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_value: Decimal,
    pub reorder_level: i32,
    pub location: Option<String>,
    pub barcode: Option<String>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<ItemEntity> for domain::models::Item {
    fn from(entity: ItemEntity) -> Self {
        Self {
            id: entity.id,
            item_name: entity.item_name,
            category_id: entity.category_id,
            category_name: entity.category_name,
            description: entity.description,
            quantity: entity.quantity,
            unit_price: entity.unit_price,
            total_value: entity.total_value,
            reorder_level: entity.reorder_level,
            location: entity.location,
            barcode: entity.barcode,
            created_by: entity.created_by,
            updated_by: entity.updated_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            is_active: entity.is_active,
        }
    }
}
