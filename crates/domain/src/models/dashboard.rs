//! Dashboard summary models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stock_transaction::StockTransaction;

/// Number of transactions shown on the dashboard.
pub const RECENT_TRANSACTIONS_LIMIT: i64 = 10;

/// Summary statistics over active items, recomputed on every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_items: i64,
    pub total_value: Decimal,
    pub low_stock_count: i64,
    pub category_distribution: Vec<CategoryDistribution>,
    pub recent_transactions: Vec<StockTransaction>,
}

/// Item count and value for one category. Empty categories are included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDistribution {
    pub category_id: i64,
    pub category_name: String,
    pub item_count: i64,
    pub total_value: Decimal,
}
