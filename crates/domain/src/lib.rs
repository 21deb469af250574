//! Domain layer for the inventory backend.
//!
//! This crate contains:
//! - Domain models (User, Category, Item, StockTransaction, ActivityLog)
//! - Listing filters and sort options
//! - Activity log construction

pub mod models;
pub mod services;
