//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! All routes sit under the configured prefix (default `/api`).
//!
//! ```text
//! GET    /                           - Service banner
//! GET    /health                     - Liveness and version
//! GET    /health/ready               - Readiness (database reachable)
//!
//! # Auth
//! POST   /auth/login                 - Email or mobile + password -> bearer token
//! GET    /auth/me                    - Current identity
//!
//! # Orders
//! GET    /admin/orders               - List (status, search, page, limit)
//! GET    /admin/orders/stats         - Dashboard counts
//! GET    /admin/orders/{id}          - Single order
//! GET    /orders/{id}                - Single order (alias)
//! PUT    /admin/orders/{id}/status   - Set status (PATCH accepted too)
//! POST   /admin/orders/{id}/cancel   - Cancel with optional reason
//!
//! # Push notifications
//! POST   /admin/push-tokens          - Register device token
//! DELETE /admin/push-tokens          - Unregister device token
//! ```

pub mod auth;
pub mod health;
pub mod orders;
pub mod push_tokens;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::cors_layer;
use crate::state::AppState;

/// All routes, relative to the API prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(orders::router())
        .merge(push_tokens::router())
}

/// The complete application: routes nested under the prefix, with tracing
/// and CORS applied.
pub fn app(state: AppState) -> Router {
    let prefix = state.config().api_prefix.clone();
    let router = if prefix.is_empty() {
        routes()
    } else {
        Router::new().nest(&prefix, routes())
    };

    router
        .layer(cors_layer(&state.config().cors_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
