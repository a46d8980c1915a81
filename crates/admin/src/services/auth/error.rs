//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
///
/// The display strings of the client-facing variants are returned verbatim
/// in API error bodies.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identifier or wrong password.
    #[error("Invalid email/mobile or password")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("Account is deactivated. Contact admin.")]
    AccountInactive,

    /// The bearer token's expiry has passed.
    #[error("Token has expired")]
    TokenExpired,

    /// The bearer token is malformed or its signature does not verify.
    #[error("Invalid token")]
    TokenInvalid,

    /// Signing a new token failed.
    #[error("token signing failed: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
