//! Liveness, readiness and banner endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::state::AppState;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "dribble-admin-api";
/// API version reported by `/health` and `/`.
pub const API_VERSION: &str = "2.0.0";

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness probe. Never touches the database.
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": API_VERSION,
    }))
}

/// Readiness probe - checks database connectivity.
///
/// GET /health/ready
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

/// Service banner.
///
/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "DRIBBLE Admin API",
        "version": API_VERSION,
    }))
}
