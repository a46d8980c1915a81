//! Push-notification device registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dribble_core::{AdminUserId, PushTokenId, PushTokenValue};

/// A stored device token. One row per token string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushToken {
    pub id: PushTokenId,
    /// Account that most recently registered this device.
    pub user_id: AdminUserId,
    pub push_token: PushTokenValue,
    /// Opaque client-supplied metadata (platform, model, app version).
    pub device_info: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for registering and unregistering a device.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushTokenRegistration {
    #[serde(default)]
    pub push_token: Option<String>,
    #[serde(default)]
    pub device_info: Option<serde_json::Value>,
}
