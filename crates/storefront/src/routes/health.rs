//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Ready once a Bling token record can be read from the store. Returns
/// 503 Service Unavailable before the store has been seeded or while the
/// database is unreachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().client().store().load().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
