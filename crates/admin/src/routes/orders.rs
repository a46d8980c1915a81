//! Order route handlers.
//!
//! Reads are open to every role. Status changes and cancellation need a
//! role that may manage orders.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use dribble_core::{OrderId, OrderStatus};

use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::auth::{RequireAdminAuth, RequireOrderManager};
use crate::models::order::{Order, OrderListQuery, OrderStats};
use crate::services::orders::OrderError;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(index))
        .route("/admin/orders/stats", get(stats))
        .route("/admin/orders/{id}", get(show))
        .route("/orders/{id}", get(show))
        .route(
            "/admin/orders/{id}/status",
            axum::routing::put(update_status).patch(update_status),
        )
        .route("/admin/orders/{id}/cancel", post(cancel))
}

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Body for a status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Optional body for a cancellation.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Cancellation response body.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
    pub message: &'static str,
    pub order_id: OrderId,
    pub order_number: String,
    pub order: Order,
}

/// Path IDs that are not UUIDs cannot name an order.
fn parse_order_id(raw: &str) -> Result<OrderId, AppError> {
    raw.parse()
        .map_err(|_| AppError::from(OrderError::NotFound))
}

/// Cancel bodies are optional; an empty body means "no reason given".
fn parse_cancel_body(body: &[u8]) -> Result<CancelRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CancelRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

/// List orders, newest first.
///
/// GET /admin/orders?status=&search=&page=&limit=
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip_all, fields(status = ?params.status, page = ?params.page))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<OrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let query = OrderListQuery::from_params(
        params.status.as_deref(),
        params.search.as_deref(),
        params.page,
        params.limit,
    );
    Ok(Json(state.orders().list(&query).await?))
}

/// Dashboard counts.
///
/// GET /admin/orders/stats
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip_all)]
pub async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<OrderStats>, AppError> {
    Ok(Json(state.orders().stats().await?))
}

/// One order.
///
/// GET /admin/orders/{id} and GET /orders/{id}
///
/// # Errors
///
/// Returns 404 if the order does not exist.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let id = parse_order_id(&id)?;
    Ok(Json(state.orders().get_by_id(id).await?))
}

/// Set an order's status. PATCH is kept as an alias for older clients.
///
/// PUT /admin/orders/{id}/status
///
/// # Errors
///
/// Returns 404 if the order does not exist, 403 for read-only roles and 422
/// for a status outside the known set.
#[instrument(skip_all, fields(order_id = %id, status = %body.status))]
pub async fn update_status(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Order>, AppError> {
    let id = parse_order_id(&id)?;
    let order = state.orders().set_status(id, body.status, &admin).await?;
    Ok(Json(order))
}

/// Cancel an order.
///
/// POST /admin/orders/{id}/cancel
///
/// # Errors
///
/// Returns 404 if the order does not exist and 400 if it is already
/// cancelled, delivered, or with the courier.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn cancel(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CancelResponse>, AppError> {
    let id = parse_order_id(&id)?;
    let request = parse_cancel_body(&body)?;

    let order = state
        .orders()
        .cancel(id, request.reason.as_deref(), &admin)
        .await?;

    Ok(Json(CancelResponse {
        success: true,
        message: "Order cancelled successfully",
        order_id: id,
        order_number: order.order_number.clone(),
        order,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_non_uuid_ids_are_not_found() {
        let err = parse_order_id("ORD-2026-0001").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(parse_order_id("6f1c1f7e-2f52-4a39-9d9a-6b1a3c1e2d10").is_ok());
    }

    #[test]
    fn test_cancel_body_is_optional() {
        assert!(parse_cancel_body(b"").unwrap().reason.is_none());
        assert!(parse_cancel_body(b"  \n").unwrap().reason.is_none());
        assert!(parse_cancel_body(b"{}").unwrap().reason.is_none());
        assert_eq!(
            parse_cancel_body(br#"{"reason":"Customer request"}"#)
                .unwrap()
                .reason
                .as_deref(),
            Some("Customer request")
        );
    }

    #[test]
    fn test_cancel_body_rejects_garbage() {
        let err = parse_cancel_body(b"reason=late").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
