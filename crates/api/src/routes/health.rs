//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;

/// Full health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub status: String,
}

impl StatusResponse {
    fn new(success: bool, status: &str) -> Self {
        Self {
            success,
            status: status.to_string(),
        }
    }
}

async fn ping(state: &AppState) -> bool {
    sqlx::query("SELECT 1").execute(&state.pool).await.is_ok()
}

/// GET /api/health
///
/// Reports process and database status. Responds 503 when the database is
/// unreachable, with the same body shape.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let db_connected = ping(&state).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let response = HealthResponse {
        success: db_connected,
        message: if db_connected {
            "Server is running"
        } else {
            "Database unavailable"
        }
        .to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: db_connected,
            latency_ms: db_connected.then_some(latency_ms),
        },
    };

    let status = if db_connected {
        StatusCode::OK
    } else {
        tracing::warn!("Health check failed: database unreachable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe. 200 while the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse::new(true, "alive"))
}

/// Readiness probe. 200 once the database accepts queries.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    if ping(&state).await {
        (StatusCode::OK, Json(StatusResponse::new(true, "ready")))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse::new(false, "not_ready")),
        )
    }
}
