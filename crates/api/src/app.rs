use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{get, post},
    BoxError, Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{auth, categories, health, inventory, reports};
use crate::services::ActivityRecorder;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub activity: ActivityRecorder,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// Builds the router. Fails only if the JWT secret is unusable.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let config = Arc::new(config);

    let jwt = Arc::new(JwtConfig::with_leeway(
        &config.jwt.secret,
        config.jwt.token_expiry_secs,
        config.jwt.leeway_secs,
    )?);

    // rate_limit_per_minute = 0 disables the limiter
    let rate_limiter = (config.security.rate_limit_per_minute > 0)
        .then(|| Arc::new(RateLimiterState::new(config.security.rate_limit_per_minute)));

    let state = AppState {
        activity: ActivityRecorder::new(pool.clone()),
        pool,
        config: config.clone(),
        jwt,
        rate_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Any authenticated user; role checks happen in the handlers.
    // Middleware order: auth runs first, then rate limiting (which needs the caller)
    let protected_routes = Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/current", get(auth::current_user))
        .route("/api/v1/auth/register", post(auth::register))
        .route(
            "/api/v1/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/v1/inventory",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route(
            "/api/v1/inventory/:id",
            get(inventory::get_item)
                .put(inventory::update_item)
                .delete(inventory::delete_item),
        )
        .route(
            "/api/v1/inventory/:id/transactions",
            get(inventory::list_item_transactions),
        )
        .route("/api/v1/reports/dashboard", get(reports::dashboard))
        .route("/api/v1/reports/activity", get(reports::activity))
        .route("/api/v1/reports/export/csv", get(reports::export_csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public_routes = Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                ))),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Turns errors from fallible tower layers into JSON error bodies.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request exceeded the configured timeout");
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("Unhandled middleware error: {}", err))
    }
}
