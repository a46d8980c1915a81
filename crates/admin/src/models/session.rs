//! The authenticated caller of a request.

use serde::{Deserialize, Serialize};

use dribble_core::{AdminRole, AdminUserId};

use super::admin_user::AdminProfile;

/// Identity recovered from a verified bearer token.
///
/// Built purely from token claims; the account is not re-read per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Account ID.
    pub id: AdminUserId,
    /// Email, or the mobile number for accounts without one.
    pub email: String,
    /// Permission level at the time of login.
    pub role: AdminRole,
}

impl CurrentAdmin {
    /// Profile built from the token alone, used when the account has since
    /// been removed.
    #[must_use]
    pub fn claims_profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            email: self.email.clone(),
            name: None,
            role: self.role,
        }
    }

    /// How this caller is recorded on audit fields such as `cancelled_by`.
    #[must_use]
    pub fn audit_name(&self) -> String {
        if self.email.is_empty() {
            self.id.to_string()
        } else {
            self.email.clone()
        }
    }
}
