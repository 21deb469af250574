//! Per-user rate limiting.
//!
//! One token bucket per authenticated user id. Runs after
//! [`super::require_auth`] so the caller is known.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use crate::app::AppState;
use crate::extractors::AuthContext;

type UserRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const FALLBACK_LIMIT: NonZeroU32 = match NonZeroU32::new(100) {
    Some(v) => v,
    None => unreachable!(),
};

/// Rate limiter state shared across all requests.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<i64, Arc<UserRateLimiter>>>,
    rate_limit_per_minute: u32,
    clock: DefaultClock,
}

impl RateLimiterState {
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            rate_limit_per_minute,
            clock: DefaultClock::default(),
        }
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    fn get_or_create_limiter(&self, user_id: i64) -> Arc<UserRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(limiter) = limiters.get(&user_id) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap_or_else(|e| e.into_inner());
        limiters
            .entry(user_id)
            .or_insert_with(|| {
                let per_minute =
                    NonZeroU32::new(self.rate_limit_per_minute).unwrap_or(FALLBACK_LIMIT);
                Arc::new(GovRateLimiter::direct(Quota::per_minute(per_minute)))
            })
            .clone()
    }

    /// `Ok(())` if allowed, otherwise the seconds to wait (at least 1).
    pub fn check(&self, user_id: i64) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(user_id);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(self.clock.now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self
            .limiters
            .read()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &active)
            .finish()
    }
}

/// Rejects with 429 once the caller exhausts their per-minute quota.
///
/// Must run after [`require_auth`](super::require_auth): the quota is keyed
/// by the authenticated user id, and requests without an [`AuthContext`]
/// pass through untouched.
///
/// # Returns
/// * The inner response while the caller has quota left
/// * `429 Too Many Requests` with a `Retry-After` header otherwise
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (Some(limiter), Some(user_id)) = (
        state.rate_limiter.as_ref(),
        req.extensions().get::<AuthContext>().map(|a| a.user_id),
    ) else {
        return next.run(req).await;
    };

    if let Err(retry_after) = limiter.check(user_id) {
        tracing::warn!(user_id = user_id, retry_after = retry_after, "Rate limit exceeded");
        return rate_limited_response(limiter.rate_limit_per_minute(), retry_after);
    }

    next.run(req).await
}

fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "success": false,
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
