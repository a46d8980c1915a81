//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::auth::{AdminAuthService, TokenIssuer};
use crate::services::orders::OrderService;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Admin configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let tokens = TokenIssuer::new(
            &config.auth.jwt_secret,
            Duration::hours(config.auth.jwt_expiration_hours),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the bearer token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Authentication service bound to this state.
    #[must_use]
    pub fn auth(&self) -> AdminAuthService<'_> {
        AdminAuthService::new(
            self.pool(),
            self.tokens(),
            self.config().auth.bootstrap.as_ref(),
        )
    }

    /// Order service bound to this state.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.pool())
    }
}
