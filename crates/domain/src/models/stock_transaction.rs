//! Stock transaction models.
//!
//! Transactions are never written directly by clients. They are derived
//! from item creation and from updates that change the quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const INITIAL_STOCK_REASON: &str = "Initial stock entry";
pub const STOCK_ADJUSTMENT_REASON: &str = "Stock adjustment";

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Add,
    Remove,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Add => "add",
            TransactionType::Remove => "remove",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(TransactionType::Add),
            "remove" => Ok(TransactionType::Remove),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded stock movement, joined with item name and actor username for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTransaction {
    pub id: i64,
    pub item_id: i64,
    pub item_name: Option<String>,
    pub transaction_type: TransactionType,
    pub quantity_change: i32,
    pub reason: Option<String>,
    pub performed_by: Option<i64>,
    pub performed_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A movement to be recorded. `quantity_change` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub transaction_type: TransactionType,
    pub quantity_change: i32,
}

impl StockDelta {
    /// Delta for a freshly created item; `None` when it starts empty.
    pub fn initial(quantity: i32) -> Option<Self> {
        Self::between(0, quantity)
    }

    /// Delta between two quantities; `None` when unchanged.
    pub fn between(old_quantity: i32, new_quantity: i32) -> Option<Self> {
        let diff = i64::from(new_quantity) - i64::from(old_quantity);
        let quantity_change = i32::try_from(diff.abs()).ok()?;

        match diff.signum() {
            1 => Some(Self {
                transaction_type: TransactionType::Add,
                quantity_change,
            }),
            -1 => Some(Self {
                transaction_type: TransactionType::Remove,
                quantity_change,
            }),
            _ => None,
        }
    }
}
