//! Push token repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use dribble_core::{AdminUserId, PushTokenId, PushTokenValue};

use super::RepositoryError;
use crate::models::push_token::PushToken;

/// Internal row type for `PostgreSQL` push token queries.
#[derive(Debug, sqlx::FromRow)]
struct PushTokenRow {
    id: Uuid,
    user_id: Uuid,
    push_token: String,
    device_info: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PushTokenRow> for PushToken {
    type Error = RepositoryError;

    fn try_from(row: PushTokenRow) -> Result<Self, Self::Error> {
        let push_token = PushTokenValue::parse(&row.push_token).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid push token in database: {e}"))
        })?;

        Ok(Self {
            id: PushTokenId::new(row.id),
            user_id: AdminUserId::new(row.user_id),
            push_token,
            device_info: row.device_info,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for push token database operations.
pub struct PushTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PushTokenRepository<'a> {
    /// Create a new push token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a device token, or take over an existing registration of
    /// the same token string (new owner, new device info).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: AdminUserId,
        token: &PushTokenValue,
        device_info: &serde_json::Value,
    ) -> Result<PushToken, RepositoryError> {
        let row = sqlx::query_as::<_, PushTokenRow>(
            r"
            INSERT INTO admin.push_tokens (id, user_id, push_token, device_info)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (push_token) DO UPDATE
            SET user_id = EXCLUDED.user_id,
                device_info = EXCLUDED.device_info,
                updated_at = NOW()
            RETURNING id, user_id, push_token, device_info, created_at, updated_at
            ",
        )
        .bind(PushTokenId::generate())
        .bind(user_id)
        .bind(token.as_str())
        .bind(device_info)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Remove a device token. Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, token: &PushTokenValue) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.push_tokens WHERE push_token = $1")
            .bind(token.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All devices registered to an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_for_user(
        &self,
        user_id: AdminUserId,
    ) -> Result<Vec<PushToken>, RepositoryError> {
        let rows = sqlx::query_as::<_, PushTokenRow>(
            r"
            SELECT id, user_id, push_token, device_info, created_at, updated_at
            FROM admin.push_tokens
            WHERE user_id = $1
            ORDER BY updated_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
