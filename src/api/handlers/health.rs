//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use std::time::Instant;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Reports whether the service can reach its database.
///
/// # Endpoint
///
/// `GET /health`
///
/// Public, and answered with `200 OK` when healthy or `503 Service
/// Unavailable` when the database round-trip fails:
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": { "database": { "status": "ok", "latencyMs": 2 } }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let ping = state.link_service.ping().await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let database = match ping {
        Ok(()) => CheckStatus::ok(latency_ms),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unreachable");
            CheckStatus::error(format!("Database error: {}", e), latency_ms)
        }
    };

    let response = HealthResponse::new(HealthChecks { database });
    let status = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
