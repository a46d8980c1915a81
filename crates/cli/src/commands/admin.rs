//! Admin account management commands.
//!
//! This is the normal way to provision accounts. First-login bootstrap via
//! `BOOTSTRAP_ADMIN_EMAIL` is only meant for a fresh deployment.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `DRIBBLE_ADMIN_PASSWORD` - password for `admin create`

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use dribble_admin::db::RepositoryError;
use dribble_admin::db::admin_users::{AdminUserRepository, NewAdminUser};
use dribble_admin::services::auth::{AuthError, hash_password};
use dribble_core::{AdminRole, Email, LoginIdentifier};

/// Shortest password accepted for new accounts.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: ADMIN_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, staff, viewer")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Invalid mobile number.
    #[error("Invalid mobile number: {0}")]
    InvalidMobile(String),

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] AuthError),

    /// No account matches the identifier.
    #[error("No admin account found for: {0}")]
    NotFound(String),
}

/// Input for `admin create`.
pub struct CreateRequest {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub password: SecretString,
}

impl CreateRequest {
    /// Validate everything that does not need the database.
    fn validate(&self) -> Result<NewAdminUser, AdminError> {
        let role: AdminRole = self
            .role
            .parse()
            .map_err(|_| AdminError::InvalidRole(self.role.clone()))?;

        let email = self
            .email
            .as_deref()
            .map(|raw| Email::parse(raw).map_err(|_| AdminError::InvalidEmail(raw.to_owned())))
            .transpose()?;

        let mobile = match self.mobile.as_deref() {
            Some(raw) => match LoginIdentifier::parse(raw) {
                Some(LoginIdentifier::Mobile(mobile)) => Some(mobile),
                _ => return Err(AdminError::InvalidMobile(raw.to_owned())),
            },
            None => None,
        };

        if email.is_none() && mobile.is_none() {
            return Err(AdminError::InvalidEmail(String::new()));
        }

        if self.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AdminError::WeakPassword);
        }

        Ok(NewAdminUser {
            email,
            mobile,
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_owned),
            role,
        })
    }
}

async fn connect() -> Result<PgPool, AdminError> {
    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;
    tracing::info!("Connecting to admin database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Create a new admin account with an Argon2id password hash.
///
/// # Errors
///
/// Returns an error for invalid input, an existing account with the same
/// email or mobile, or a database failure.
pub async fn create_user(request: &CreateRequest) -> Result<(), AdminError> {
    let new_user = request.validate()?;
    let password_hash = hash_password(request.password.expose_secret())?;

    let pool = connect().await?;
    let user = AdminUserRepository::new(&pool)
        .create(&new_user, &password_hash)
        .await?;

    tracing::info!(
        "Admin account created! ID: {}, Login: {}, Role: {}",
        user.id,
        user.login_name(),
        user.role
    );
    Ok(())
}

/// Activate or deactivate an account by email or mobile number.
///
/// # Errors
///
/// Returns `AdminError::NotFound` if no account matches.
pub async fn set_active(identifier: &str, active: bool) -> Result<(), AdminError> {
    let pool = connect().await?;
    let user = AdminUserRepository::new(&pool)
        .set_active(identifier.trim(), active)
        .await?
        .ok_or_else(|| AdminError::NotFound(identifier.to_owned()))?;

    if active {
        tracing::info!("Account {} ({}) activated", user.login_name(), user.id);
    } else {
        tracing::info!("Account {} ({}) deactivated", user.login_name(), user.id);
    }
    Ok(())
}

/// Log every account with its role and status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_users() -> Result<(), AdminError> {
    let pool = connect().await?;
    let users = AdminUserRepository::new(&pool).list_all().await?;

    tracing::info!("{} admin account(s)", users.len());
    for user in users {
        tracing::info!(
            "  {} {:<32} {:<8} {}",
            user.id,
            user.login_name(),
            user.role,
            if user.is_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, mobile: Option<&str>, role: &str) -> CreateRequest {
        CreateRequest {
            email: email.map(str::to_owned),
            mobile: mobile.map(str::to_owned),
            name: Some("  Ops  ".to_owned()),
            role: role.to_owned(),
            password: SecretString::from("correct horse battery"),
        }
    }

    #[test]
    fn test_validate_email_account() {
        let user = request(Some("ops@dribble.com"), None, "staff").validate().unwrap();
        assert_eq!(user.email.unwrap().as_str(), "ops@dribble.com");
        assert_eq!(user.role, AdminRole::Staff);
        assert_eq!(user.name.as_deref(), Some("Ops"));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            request(Some("ops@dribble.com"), None, "super_admin").validate(),
            Err(AdminError::InvalidRole(_))
        ));
        assert!(matches!(
            request(Some("not-an-email"), None, "admin").validate(),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(matches!(
            request(None, Some("ops@dribble.com"), "admin").validate(),
            Err(AdminError::InvalidMobile(_))
        ));

        let mut short = request(Some("ops@dribble.com"), None, "admin");
        short.password = SecretString::from("short");
        assert!(matches!(short.validate(), Err(AdminError::WeakPassword)));
    }
}
