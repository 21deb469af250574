//! Domain services for inventory tracking.
//!
//! Services contain business logic that operates on domain models.

pub mod activity;

pub use activity::{activity_helpers, ActivityLogBuilder, RequestContext};
