//! Integration tests for the admin authentication service.
//!
//! These tests require a migrated `PostgreSQL` database
//! (`ADMIN_DATABASE_URL`). They drive the auth service directly, so the
//! bootstrap credential can differ per test.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use secrecy::SecretString;

use dribble_admin::config::BootstrapAdmin;
use dribble_admin::models::session::CurrentAdmin;
use dribble_admin::services::auth::{AdminAuthService, AuthError, TokenIssuer};
use dribble_core::{AdminRole, AdminUserId, Email};
use dribble_integration_tests::{create_mobile_admin, test_pool, unique_mobile, unique_tag};

const SECRET: &str = "Qw7#nR2$vL9!xT4@mK8%pZ3^bH6&jF1*";

fn issuer() -> TokenIssuer {
    TokenIssuer::new(&SecretString::from(SECRET), Duration::hours(24))
}

fn bootstrap(email: &str, password: &str) -> BootstrapAdmin {
    BootstrapAdmin {
        email: Email::parse(email).unwrap(),
        password: SecretString::from(password.to_owned()),
    }
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_mobile_login() {
    let pool = test_pool().await;
    let mobile = unique_mobile();
    let user = create_mobile_admin(&pool, &mobile, "Staff-Pass-7", AdminRole::Staff).await;

    let tokens = issuer();
    let auth = AdminAuthService::new(&pool, &tokens, None);

    let success = auth.login(&mobile, "Staff-Pass-7").await.unwrap();
    assert_eq!(success.user.id, user.id);
    assert_eq!(success.user.mobile.as_deref(), Some(mobile.as_str()));

    // Accounts without an email carry the mobile number in the token.
    let admin = auth.verify(&success.access_token).unwrap();
    assert_eq!(admin.id, user.id);
    assert_eq!(admin.email, mobile);
    assert_eq!(admin.role, AdminRole::Staff);

    let err = auth.login(&mobile, "wrong-password").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_bootstrap_login_provisions_once() {
    let pool = test_pool().await;
    let email = format!("bootstrap+{}@dribble.com", unique_tag());
    let config = bootstrap(&email, "Admin123!");

    let tokens = issuer();
    let auth = AdminAuthService::new(&pool, &tokens, Some(&config));

    let first = auth.login(&email, "Admin123!").await.unwrap();
    assert_eq!(first.user.role, AdminRole::Admin);
    assert_eq!(first.user.name.as_deref(), Some("Admin"));
    assert!(first.user.is_active);

    let second = auth.login(&email, "Admin123!").await.unwrap();
    assert_eq!(second.user.id, first.user.id);

    // The bootstrap email matches regardless of case.
    let shouted = auth.login(&email.to_uppercase(), "Admin123!").await.unwrap();
    assert_eq!(shouted.user.id, first.user.id);

    let err = auth.login(&email, "Admin123?").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_bootstrap_needs_exact_password_before_account_exists() {
    let pool = test_pool().await;
    let email = format!("bootstrap+{}@dribble.com", unique_tag());
    let config = bootstrap(&email, "Admin123!");

    let tokens = issuer();
    let auth = AdminAuthService::new(&pool, &tokens, Some(&config));

    let err = auth.login(&email, "admin123!").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    // The failed attempt must not have created the account.
    let without_bootstrap = AdminAuthService::new(&pool, &tokens, None);
    let err = without_bootstrap.login(&email, "Admin123!").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_concurrent_bootstrap_logins_share_one_account() {
    let pool = test_pool().await;
    let email = format!("bootstrap+{}@dribble.com", unique_tag());
    let config = bootstrap(&email, "Admin123!");

    let tokens = issuer();
    let a = AdminAuthService::new(&pool, &tokens, Some(&config));
    let b = AdminAuthService::new(&pool, &tokens, Some(&config));

    let (first, second) = tokio::join!(a.login(&email, "Admin123!"), b.login(&email, "Admin123!"));
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!(first.user.id, second.user.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin.admin_user WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_who_am_i_falls_back_to_token_claims() {
    let pool = test_pool().await;
    let tokens = issuer();
    let auth = AdminAuthService::new(&pool, &tokens, None);

    let gone = CurrentAdmin {
        id: AdminUserId::generate(),
        email: "gone@x.com".to_owned(),
        role: AdminRole::Viewer,
    };
    let profile = auth.who_am_i(&gone).await.unwrap();
    assert_eq!(profile, gone.claims_profile());
    assert_eq!(
        serde_json::to_value(&profile).unwrap(),
        serde_json::json!({"id": gone.id, "email": "gone@x.com", "role": "viewer"})
    );
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_who_am_i_prefers_stored_account() {
    let pool = test_pool().await;
    let mobile = unique_mobile();
    let user = create_mobile_admin(&pool, &mobile, "Viewer-Pass-3", AdminRole::Viewer).await;

    let tokens = issuer();
    let auth = AdminAuthService::new(&pool, &tokens, None);

    let profile = auth.who_am_i(&CurrentAdmin::from(&user)).await.unwrap();
    assert_eq!(profile.id, user.id);
    assert_eq!(profile.email, mobile);
    assert_eq!(profile.name.as_deref(), Some("Integration"));
}
