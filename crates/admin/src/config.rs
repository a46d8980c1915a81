//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 0.0.0.0)
//! - `ADMIN_PORT` - Listen port (default: 8001)
//! - `API_PREFIX` - Path prefix for every route (default: /api)
//! - `JWT_SECRET` - Token signing secret (falls back to a built-in default, with a warning)
//! - `JWT_EXPIRATION_HOURS` - Token lifetime in hours (default: 24)
//! - `CORS_ORIGINS` - Comma-separated allowed origins, or `*` (default: *)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)
//!
//! ## Optional (first-login provisioning)
//! - `BOOTSTRAP_ADMIN_EMAIL` - Email of the account created on first login
//! - `BOOTSTRAP_ADMIN_PASSWORD` - Password that account must log in with
//!
//! ## Optional (TLS)
//! - `ADMIN_TLS_CERT` - PEM-encoded certificate chain
//! - `ADMIN_TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use dribble_core::Email;

/// Signing secret used when `JWT_SECRET` is unset. Anyone who knows it can
/// mint tokens, so startup warns loudly when it is in effect.
pub const DEFAULT_JWT_SECRET: &str = "dribble-admin-secret-key-2026";

const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;
const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Path prefix for all routes, e.g. `/api` (empty for none)
    pub api_prefix: String,
    /// Token and login settings
    pub auth: AuthConfig,
    /// Origins allowed by CORS
    pub cors_origins: CorsOrigins,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Token signing and login configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: SecretString,
    /// Token lifetime in hours
    pub jwt_expiration_hours: i64,
    /// Credential that provisions an admin account on first login
    pub bootstrap: Option<BootstrapAdmin>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("bootstrap", &self.bootstrap)
            .finish()
    }
}

impl AuthConfig {
    /// Whether the built-in fallback secret is in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret.expose_secret() == DEFAULT_JWT_SECRET
    }

    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = SecretString::from(get_env_or_default("JWT_SECRET", DEFAULT_JWT_SECRET));
        let jwt_expiration_hours = get_env_or_default(
            "JWT_EXPIRATION_HOURS",
            &DEFAULT_JWT_EXPIRATION_HOURS.to_string(),
        )
        .parse::<i64>()
        .ok()
        .filter(|hours| *hours > 0)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "JWT_EXPIRATION_HOURS".to_owned(),
                "must be a positive whole number of hours".to_owned(),
            )
        })?;
        let bootstrap = BootstrapAdmin::from_env()?;

        Ok(Self {
            jwt_secret,
            jwt_expiration_hours,
            bootstrap,
        })
    }
}

/// Credential that provisions an admin account on its first login.
#[derive(Clone)]
pub struct BootstrapAdmin {
    /// Email of the account to create
    pub email: Email,
    /// Password the account is created with
    pub password: SecretString,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BootstrapAdmin {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let email = get_optional_env("BOOTSTRAP_ADMIN_EMAIL");
        let password = get_optional_env("BOOTSTRAP_ADMIN_PASSWORD");

        match (email, password) {
            (Some(email), Some(password)) => {
                let email = Email::parse(&email).map_err(|e| {
                    ConfigError::InvalidEnvVar("BOOTSTRAP_ADMIN_EMAIL".to_owned(), e.to_string())
                })?;
                if password.is_empty() {
                    return Err(ConfigError::InvalidEnvVar(
                        "BOOTSTRAP_ADMIN_PASSWORD".to_owned(),
                        "must not be empty".to_owned(),
                    ));
                }
                Ok(Some(Self {
                    email,
                    password: SecretString::from(password),
                }))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "BOOTSTRAP_ADMIN_*".to_owned(),
                "Both BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                    .to_owned(),
            )),
        }
    }
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Any origin (`*`).
    Any,
    /// Exactly these origins.
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list; `*` (or nothing) allows any.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("ADMIN_TLS_CERT");
        let key_pem = get_optional_env("ADMIN_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "ADMIN_TLS_*".to_owned(),
                "Both ADMIN_TLS_CERT and ADMIN_TLS_KEY must be set together".to_owned(),
            )),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "8001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_owned(), e.to_string()))?;
        let api_prefix = normalize_prefix(&get_env_or_default("API_PREFIX", "/api"));
        let auth = AuthConfig::from_env()?;
        let cors_origins = CorsOrigins::parse(&get_env_or_default("CORS_ORIGINS", "*"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            api_prefix,
            auth,
            cors_origins,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Security problems worth logging at startup.
    ///
    /// Configuration is loaded before logging is initialized, so these are
    /// collected here and logged by `main`.
    #[must_use]
    pub fn security_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.auth.uses_default_secret() {
            warnings.push(
                "JWT_SECRET is not set; tokens are signed with the built-in default secret"
                    .to_owned(),
            );
        } else if let Some(weakness) = secret_weakness(self.auth.jwt_secret.expose_secret()) {
            warnings.push(format!("JWT_SECRET {weakness}"));
        }

        if self.auth.bootstrap.is_some() {
            warnings.push(
                "BOOTSTRAP_ADMIN_* is set; the first login with it creates an admin account"
                    .to_owned(),
            );
        }

        if self.cors_origins == CorsOrigins::Any {
            warnings.push("CORS allows any origin".to_owned());
        }

        warnings
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., ADMIN_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_owned())
}

/// `api/` -> `/api`, `/` -> `` (no prefix).
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Describe why a signing secret looks weak, if it does.
fn secret_weakness(secret: &str) -> Option<String> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Some(format!(
            "is shorter than {MIN_JWT_SECRET_LENGTH} characters (got {})",
            secret.len()
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Some(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Some(format!(
            "has low entropy ({entropy:.2} bits/char, want >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
        ));
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8001,
            api_prefix: "/api".to_owned(),
            auth: AuthConfig {
                jwt_secret: SecretString::from("k9$Vq2!xLm#8Zr@4Tn%6Wp^1Yb&3Hc*7"),
                jwt_expiration_hours: 24,
                bootstrap: None,
            },
            cors_origins: CorsOrigins::List(vec!["https://admin.dribble.com".to_owned()]),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8001);
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/v2/admin/"), "/v2/admin");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn test_cors_origins_parse() {
        assert_eq!(CorsOrigins::parse("*"), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse(""), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse("https://a.com, *"), CorsOrigins::Any);
        assert_eq!(
            CorsOrigins::parse("https://a.com, https://b.com ,"),
            CorsOrigins::List(vec!["https://a.com".to_owned(), "https://b.com".to_owned()])
        );
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("abab") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_secret_weakness() {
        assert!(secret_weakness("short").is_some());
        assert!(
            secret_weakness("changeme-changeme-changeme-changeme")
                .unwrap()
                .contains("placeholder")
        );
        assert!(secret_weakness(&"ab".repeat(20)).unwrap().contains("entropy"));
        assert!(secret_weakness("k9$Vq2!xLm#8Zr@4Tn%6Wp^1Yb&3Hc*7").is_none());
    }

    #[test]
    fn test_default_secret_is_flagged() {
        let mut config = config();
        assert!(config.security_warnings().is_empty());

        config.auth.jwt_secret = SecretString::from(DEFAULT_JWT_SECRET);
        assert!(config.auth.uses_default_secret());
        let warnings = config.security_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("JWT_SECRET is not set"));
    }

    #[test]
    fn test_permissive_cors_and_bootstrap_are_flagged() {
        let mut config = config();
        config.cors_origins = CorsOrigins::Any;
        config.auth.bootstrap = Some(BootstrapAdmin {
            email: Email::parse("admin@dribble.com").unwrap(),
            password: SecretString::from("Admin123!"),
        });
        assert_eq!(config.security_warnings().len(), 2);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = config();
        config.auth.bootstrap = Some(BootstrapAdmin {
            email: Email::parse("admin@dribble.com").unwrap(),
            password: SecretString::from("Admin123!"),
        });
        let debug = format!("{config:?}");
        assert!(!debug.contains("k9$Vq2"));
        assert!(!debug.contains("Admin123!"));
        assert!(debug.contains("admin@dribble.com"));
    }
}
