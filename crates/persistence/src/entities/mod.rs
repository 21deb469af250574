//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod activity_log;
pub mod category;
pub mod item;
pub mod stock_transaction;
pub mod user;

pub use activity_log::ActivityLogEntity;
pub use category::CategoryEntity;
pub use item::ItemEntity;
pub use stock_transaction::StockTransactionEntity;
pub use user::UserEntity;
