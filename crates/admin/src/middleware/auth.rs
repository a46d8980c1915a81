//! Bearer-token authentication extractors.
//!
//! Tokens are verified statelessly against the signing secret; the account
//! table is not consulted per request.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::session::CurrentAdmin;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when a request is not authenticated.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// The token did not verify.
    InvalidToken(AuthError),
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingToken => AppError::Unauthorized("Not authenticated".to_owned()),
            Self::InvalidToken(err) => AppError::from(err),
        }
        .into_response()
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AdminAuthRejection::MissingToken)?;

        let admin = state
            .auth()
            .verify(token)
            .map_err(AdminAuthRejection::InvalidToken)?;

        set_sentry_user(admin.id, Some(&admin.email));
        Ok(Self(admin))
    }
}

/// Extractor that requires a bearer token whose role may change orders
/// (admin or staff). Viewers get 403 Forbidden.
pub struct RequireOrderManager(pub CurrentAdmin);

/// Error returned when order management is required.
#[derive(Debug)]
pub enum OrderManagerRejection {
    /// Not authenticated at all.
    Unauthenticated(AdminAuthRejection),
    /// Authenticated, but the role is read-only.
    Forbidden,
}

impl IntoResponse for OrderManagerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(rejection) => rejection.into_response(),
            Self::Forbidden => {
                AppError::Forbidden("Your role does not allow changing orders".to_owned())
                    .into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireOrderManager {
    type Rejection = OrderManagerRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state)
            .await
            .map_err(OrderManagerRejection::Unauthenticated)?;

        if !admin.role.can_manage_orders() {
            tracing::info!(user_id = %admin.id, role = %admin.role, "Order change refused for role");
            return Err(OrderManagerRejection::Forbidden);
        }

        Ok(Self(admin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes_and_blanks() {
        assert_eq!(bearer_token(&parts(None)), None);
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer    "))), None);
    }
}
