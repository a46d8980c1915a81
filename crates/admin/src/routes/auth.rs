//! Authentication route handlers.
//!
//! Login by email or mobile number returns a bearer token; `/auth/me`
//! echoes the identity behind it.

use axum::{Json, Router, extract::State, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::auth::RequireAdminAuth;
use crate::models::admin_user::AdminProfile;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

/// Login request body. `email` may also hold a mobile number.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: AdminProfile,
}

/// Exchange credentials for a bearer token.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns 401 for unknown accounts, wrong passwords and deactivated accounts.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let success = state.auth().login(&body.email, &body.password).await?;

    Ok(Json(LoginResponse {
        access_token: success.access_token,
        token_type: "bearer",
        user: success.user.profile(),
    }))
}

/// Profile of the authenticated caller.
///
/// GET /auth/me
///
/// # Errors
///
/// Returns 401 without a valid token.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn me(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<AdminProfile>, AppError> {
    Ok(Json(state.auth().who_am_i(&admin).await?))
}
