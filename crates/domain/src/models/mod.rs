//! Domain models for inventory tracking.

pub mod activity_log;
pub mod category;
pub mod dashboard;
pub mod item;
pub mod stock_transaction;
pub mod user;

pub use activity_log::{
    ActivityAction, ActivityLog, ActivityLogFilter, CreateActivityLogInput, EntityType,
    ListActivityLogsQuery, ACTIVITY_DEFAULT_LIMIT,
};
pub use category::{Category, CreateCategoryRequest};
pub use dashboard::{CategoryDistribution, DashboardSummary, RECENT_TRANSACTIONS_LIMIT};
pub use item::{
    CreateItemRequest, Item, ItemFilter, ItemFilterClause, ItemListQuery, ItemSort, ItemValues,
    SortField, SortOrder, UpdateItemRequest,
};
pub use stock_transaction::{
    StockDelta, StockTransaction, TransactionType, INITIAL_STOCK_REASON, STOCK_ADJUSTMENT_REASON,
};
pub use user::{LoginRequest, NewUser, RegisterUserRequest, Role, User, UserProfile};
