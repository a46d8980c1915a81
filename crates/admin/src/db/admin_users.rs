//! Admin user repository for database operations.
//!
//! Accounts are looked up by email *or* mobile number; both columns are
//! unique, so an identifier resolves to at most one account.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use dribble_core::{AdminRole, AdminUserId, Email};

use super::{RepositoryError, conflict_on_unique};
use crate::models::admin_user::AdminUser;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: Uuid,
    email: Option<String>,
    mobile: Option<String>,
    name: Option<String>,
    role: AdminRole,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            email,
            mobile: row.mobile,
            name: row.name,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row joined with the stored password hash, for login only.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserWithHashRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
}

const ADMIN_USER_COLUMNS: &str =
    "id, email, mobile, name, role, is_active, created_at, updated_at";

/// Fields for a new account.
#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub email: Option<Email>,
    pub mobile: Option<String>,
    pub name: Option<String>,
    pub role: AdminRole,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_USER_COLUMNS} FROM admin.admin_user ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_USER_COLUMNS} FROM admin.admin_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Find an account whose email or mobile equals `identifier`, together
    /// with its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_password_hash(
        &self,
        identifier: &str,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserWithHashRow>(&format!(
            "SELECT {ADMIN_USER_COLUMNS}, password_hash
             FROM admin.admin_user
             WHERE email = $1 OR mobile = $1
             LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((AdminUser::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// Create a new admin user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or mobile is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        new_user: &NewAdminUser,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "INSERT INTO admin.admin_user (id, email, mobile, name, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ADMIN_USER_COLUMNS}"
        ))
        .bind(AdminUserId::generate())
        .bind(new_user.email.as_ref())
        .bind(new_user.mobile.as_deref())
        .bind(new_user.name.as_deref())
        .bind(password_hash)
        .bind(new_user.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "account"))?;

        row.try_into()
    }

    /// Activate or deactivate the account matching `identifier`.
    ///
    /// Returns `None` if no account matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_active(
        &self,
        identifier: &str,
        is_active: bool,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "UPDATE admin.admin_user
             SET is_active = $2, updated_at = NOW()
             WHERE email = $1 OR mobile = $1
             RETURNING {ADMIN_USER_COLUMNS}"
        ))
        .bind(identifier)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
