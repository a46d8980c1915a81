//! Admin authentication service.
//!
//! Password login by email or mobile number, stateless bearer tokens, and
//! the `/auth/me` profile lookup.
//!
//! Accounts are normally provisioned out-of-band with
//! `dribble-cli admin create`. When a bootstrap credential is configured, the
//! first login with exactly that credential creates the account instead.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};

use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use dribble_core::{AdminRole, LoginIdentifier};

use crate::config::BootstrapAdmin;
use crate::db::RepositoryError;
use crate::db::admin_users::{AdminUserRepository, NewAdminUser};
use crate::models::admin_user::{AdminProfile, AdminUser};
use crate::models::session::CurrentAdmin;

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    /// Signed bearer token.
    pub access_token: String,
    /// The account that logged in.
    pub user: AdminUser,
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
    tokens: &'a TokenIssuer,
    bootstrap: Option<&'a BootstrapAdmin>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        tokens: &'a TokenIssuer,
        bootstrap: Option<&'a BootstrapAdmin>,
    ) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
            tokens,
            bootstrap,
        }
    }

    /// Log in with an email or mobile number and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no account matches or the
    /// password is wrong, and `AuthError::AccountInactive` for deactivated
    /// accounts (checked before the password).
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginSuccess, AuthError> {
        let identifier = LoginIdentifier::parse(identifier).ok_or(AuthError::InvalidCredentials)?;

        let (user, password_hash) = match self.users.get_password_hash(identifier.as_str()).await? {
            Some(found) => found,
            None if matches_bootstrap(self.bootstrap, &identifier, password) => {
                self.provision_bootstrap(password).await?
            }
            None => {
                tracing::info!(identifier = %identifier, "Login for unknown account");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login refused for deactivated account");
            return Err(AuthError::AccountInactive);
        }

        verify_password(password, &password_hash)?;

        let admin = CurrentAdmin::from(&user);
        let access_token = self.tokens.issue(&admin, Utc::now())?;

        tracing::info!(user_id = %user.id, role = %user.role, "Admin logged in");
        Ok(LoginSuccess { access_token, user })
    }

    /// Check a bearer token and return the identity it carries.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::TokenInvalid`.
    pub fn verify(&self, token: &str) -> Result<CurrentAdmin, AuthError> {
        self.tokens.verify(token)
    }

    /// Fuller profile for the caller. Falls back to the token's own claims
    /// if the account no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn who_am_i(&self, admin: &CurrentAdmin) -> Result<AdminProfile, AuthError> {
        let profile = self
            .users
            .get_by_id(admin.id)
            .await?
            .map_or_else(|| admin.claims_profile(), |user| user.profile());
        Ok(profile)
    }

    async fn provision_bootstrap(&self, password: &str) -> Result<(AdminUser, String), AuthError> {
        let Some(bootstrap) = self.bootstrap else {
            return Err(AuthError::InvalidCredentials);
        };

        let password_hash = hash_password(password)?;
        let new_user = NewAdminUser {
            email: Some(bootstrap.email.clone()),
            mobile: None,
            name: Some("Admin".to_owned()),
            role: AdminRole::Admin,
        };

        match self.users.create(&new_user, &password_hash).await {
            Ok(user) => {
                tracing::warn!(
                    user_id = %user.id,
                    email = %bootstrap.email,
                    "Provisioned bootstrap admin account on first login"
                );
                Ok((user, password_hash))
            }
            // Two concurrent first logins: the other one created it.
            Err(RepositoryError::Conflict(_)) => self
                .users
                .get_password_hash(bootstrap.email.as_str())
                .await?
                .ok_or(AuthError::InvalidCredentials),
            Err(e) => Err(e.into()),
        }
    }
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.login_name().to_owned(),
            role: user.role,
        }
    }
}

/// Whether a login attempt uses exactly the configured bootstrap credential.
fn matches_bootstrap(
    bootstrap: Option<&BootstrapAdmin>,
    identifier: &LoginIdentifier,
    password: &str,
) -> bool {
    match (bootstrap, identifier) {
        (Some(bootstrap), LoginIdentifier::Email(email)) => {
            email.as_str().eq_ignore_ascii_case(bootstrap.email.as_str())
                && password == bootstrap.password.expose_secret()
        }
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dribble_core::{AdminUserId, Email};
    use secrecy::SecretString;

    use super::*;

    fn bootstrap() -> BootstrapAdmin {
        BootstrapAdmin {
            email: Email::parse("admin@dribble.com").unwrap(),
            password: SecretString::from("Admin123!".to_owned()),
        }
    }

    #[test]
    fn test_bootstrap_requires_configuration() {
        let id = LoginIdentifier::parse("admin@dribble.com").unwrap();
        assert!(!matches_bootstrap(None, &id, "Admin123!"));
    }

    #[test]
    fn test_bootstrap_requires_exact_password() {
        let b = bootstrap();
        let id = LoginIdentifier::parse("admin@dribble.com").unwrap();
        assert!(matches_bootstrap(Some(&b), &id, "Admin123!"));
        assert!(!matches_bootstrap(Some(&b), &id, "admin123!"));
        assert!(!matches_bootstrap(Some(&b), &id, ""));
    }

    #[test]
    fn test_bootstrap_ignores_other_identifiers() {
        let b = bootstrap();
        let other = LoginIdentifier::parse("ops@dribble.com").unwrap();
        assert!(!matches_bootstrap(Some(&b), &other, "Admin123!"));
        let mobile = LoginIdentifier::parse("9876543210").unwrap();
        assert!(!matches_bootstrap(Some(&b), &mobile, "Admin123!"));
    }

    #[test]
    fn test_current_admin_from_mobile_only_account() {
        let now = Utc::now();
        let user = AdminUser {
            id: AdminUserId::generate(),
            email: None,
            mobile: Some("9876543210".to_owned()),
            name: Some("Priya".to_owned()),
            role: AdminRole::Viewer,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let admin = CurrentAdmin::from(&user);
        assert_eq!(admin.id, user.id);
        assert_eq!(admin.email, "9876543210");
        assert_eq!(admin.role, AdminRole::Viewer);
    }
}
