//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dribble_core::{AdminRole, AdminUserId, Email};

/// A staff account (domain type). The password hash never leaves the
/// repository layer.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Email address, if the account has one.
    pub email: Option<Email>,
    /// Mobile number, if the account has one.
    pub mobile: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Permission level.
    pub role: AdminRole,
    /// Deactivated accounts cannot log in.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// The identifier embedded in issued tokens: the email, else the mobile.
    #[must_use]
    pub fn login_name(&self) -> &str {
        self.email
            .as_ref()
            .map(Email::as_str)
            .or(self.mobile.as_deref())
            .unwrap_or_default()
    }

    /// Public-safe summary returned by login and `/auth/me`.
    #[must_use]
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            email: self
                .email
                .as_ref()
                .map(|e| e.as_str().to_owned())
                .unwrap_or_default(),
            name: Some(self.name.clone().unwrap_or_default()),
            role: self.role,
        }
    }
}

/// Identity summary safe to hand to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminProfile {
    pub id: AdminUserId,
    pub email: String,
    /// Absent when the profile was rebuilt from token claims alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: AdminRole,
}
