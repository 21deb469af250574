//! Application services used by the route handlers.

pub mod activity;
pub mod admin_bootstrap;
pub mod auth;

pub use activity::ActivityRecorder;
pub use admin_bootstrap::{bootstrap_admin, BootstrapOutcome};
pub use auth::{AuthError, AuthService, LoginOutcome};
