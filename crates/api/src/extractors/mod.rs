//! Custom Axum extractors.

pub mod auth;
pub mod client;

pub use auth::{bearer_token, AuthContext};
pub use client::ClientContext;
