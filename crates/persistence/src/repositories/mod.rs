//! Repository implementations for database operations.

pub mod activity_log;
pub mod category;
pub mod dashboard;
pub mod item;
pub mod stock_transaction;
pub mod user;

pub use activity_log::ActivityLogRepository;
pub use category::CategoryRepository;
pub use dashboard::DashboardRepository;
pub use item::{ItemRepository, ItemUpdateOutcome, ItemWriteError};
pub use stock_transaction::StockTransactionRepository;
pub use user::UserRepository;
