//! Push notification token handlers.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use dribble_core::PushTokenValue;

use crate::db::PushTokenRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireAdminAuth;
use crate::models::push_token::PushTokenRegistration;
use crate::state::AppState;

/// Build the push token router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/push-tokens", post(register).delete(unregister))
}

/// Acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Lenient body parsing. Missing, empty and malformed bodies all read as
/// "no token".
fn parse_registration(body: &[u8]) -> PushTokenRegistration {
    serde_json::from_slice(body).unwrap_or_default()
}

/// Register this device for push notifications, or move an existing
/// registration of the same token to the caller.
///
/// POST /admin/push-tokens
///
/// # Errors
///
/// Returns 400 if no token is given or it is not a plausible token.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn register(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let registration = parse_registration(&body);
    let raw = registration
        .push_token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Push token is required".to_owned()))?;
    let token = PushTokenValue::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let device_info = registration
        .device_info
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

    PushTokenRepository::new(state.pool())
        .upsert(admin.id, &token, &device_info)
        .await?;

    tracing::info!("Push token registered");
    Ok(Json(MessageResponse {
        message: "Push token registered successfully",
    }))
}

/// Forget a device token. Unknown or missing tokens are not an error.
///
/// DELETE /admin/push-tokens
///
/// # Errors
///
/// Returns 500 if the delete fails.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn unregister(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let registration = parse_registration(&body);
    if let Some(token) = registration
        .push_token
        .as_deref()
        .and_then(|raw| PushTokenValue::parse(raw).ok())
    {
        let removed = PushTokenRepository::new(state.pool()).delete(&token).await?;
        tracing::info!(removed, "Push token unregistered");
    }

    Ok(Json(MessageResponse {
        message: "Push token unregistered",
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_parsing_is_lenient() {
        assert!(parse_registration(b"").push_token.is_none());
        assert!(parse_registration(b"not json").push_token.is_none());

        let reg = parse_registration(
            br#"{"push_token":"ExponentPushToken[abc]","device_info":{"os":"ios"}}"#,
        );
        assert_eq!(reg.push_token.as_deref(), Some("ExponentPushToken[abc]"));
        assert_eq!(reg.device_info.unwrap()["os"], "ios");
    }
}
