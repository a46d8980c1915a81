//! Unified error handling for the admin API.
//!
//! Every error response has the body `{"detail": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use dribble_core::AdminUserId;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller's role does not allow the action.
    #[error("{0}")]
    Forbidden(String),

    /// Request conflicts with the current state of the resource.
    #[error("{0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Request body or query string could not be decoded.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected { status, .. } => *status,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::TokenExpired
            | AuthError::TokenInvalid => Self::Unauthorized(err.to_string()),
            AuthError::Repository(e) => e.into(),
            AuthError::TokenSigning(_) | AuthError::PasswordHash => Self::Internal(err.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound => Self::NotFound(err.to_string()),
            OrderError::InvalidState(refusal) => Self::BadRequest(refusal.to_string()),
            OrderError::Conflict => Self::Conflict(err.to_string()),
            OrderError::Repository(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(admin_user_id: AdminUserId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;
    use crate::services::orders::CancelRefusal;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::AccountInactive,
            AuthError::TokenExpired,
            AuthError::TokenInvalid,
        ] {
            assert_eq!(AppError::from(err).status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(
            AppError::from(AuthError::PasswordHash).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_errors_map_to_404_and_400() {
        assert_eq!(
            AppError::from(OrderError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(OrderError::InvalidState(CancelRefusal::Delivered)).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_cancel_conflict_is_409() {
        assert_eq!(
            AppError::from(OrderError::Conflict).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(OrderError::Repository(RepositoryError::Conflict(
                "order number already exists".to_owned()
            )))
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(RepositoryError::DataCorruption("bad row".to_owned())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_and_detail_shape() {
        let response = AppError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: "missing field `password`".to_owned(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "missing field `password`" })
        );
    }

    #[tokio::test]
    async fn test_body_carries_detail_message() {
        let response = AppError::from(OrderError::NotFound).into_response();
        assert_eq!(body_json(response).await, json!({ "detail": "Order not found" }));

        let response = AppError::from(AuthError::TokenExpired).into_response();
        assert_eq!(body_json(response).await, json!({ "detail": "Token has expired" }));

        let response =
            AppError::from(OrderError::InvalidState(CancelRefusal::AlreadyCancelled)).into_response();
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Order is already cancelled" })
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = AppError::Internal("pool exhausted at 10.0.0.4".to_owned()).into_response();
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Internal server error" })
        );
    }
}
