//! End-to-end tests for the auth service: issuance, refresh and the
//! authorization decisions derived from decoded tokens.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockDirectory;
use gatehouse_auth_core::{
    has_roles, AuthConfig, AuthError, AuthService, DecodeError, TokenClaims,
};
use gatehouse_types::Role;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

fn service(directory: MockDirectory) -> AuthService<MockDirectory> {
    AuthService::new(AuthConfig::try_new(SECRET).unwrap(), Arc::new(directory))
}

fn seeded_service() -> (AuthService<MockDirectory>, MockDirectory) {
    let directory = MockDirectory::new();
    directory.seed_user("mariorossi", "test-pwd", &["user"]);
    directory.seed_user("admin.user", "admin-pwd", &["admin", "user"]);
    (service(directory.clone()), directory)
}

#[tokio::test]
async fn test_login_issues_access_and_refresh_pair() {
    let (auth, _) = seeded_service();

    let pair = auth.login("mariorossi", "test-pwd").await.unwrap();

    let access = auth.is_authorized(&pair.access_token).unwrap();
    assert!(access.authenticated);
    let claims = TokenClaims::from_raw(&access.claims).unwrap();
    assert_eq!(claims.username, "mariorossi");
    assert_eq!(claims.roles, vec![Role::User]);

    // a refresh token presented where an access token is required is
    // decoded fine but never authenticates
    let refresh = auth.is_authorized(&pair.refresh_token).unwrap();
    assert!(!refresh.authenticated);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (auth, _) = seeded_service();
    let result = auth.login("mariorossi", "bad-pwd").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_unknown_user_is_indistinguishable() {
    let (auth, _) = seeded_service();
    let result = auth.login("nobody", "test-pwd").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_refresh_returns_fresh_pair() {
    let (auth, _) = seeded_service();
    let pair = auth.login("mariorossi", "test-pwd").await.unwrap();

    let renewed = auth.refresh(&pair.refresh_token).await.unwrap();

    let access = auth.is_authorized(&renewed.access_token).unwrap();
    assert!(access.authenticated);
    let claims = TokenClaims::from_raw(&access.claims).unwrap();
    assert_eq!(claims.username, "mariorossi");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (auth, _) = seeded_service();
    let pair = auth.login("mariorossi", "test-pwd").await.unwrap();

    let result = auth.refresh(&pair.access_token).await;
    assert!(matches!(result, Err(AuthError::PurposeMismatch)));
}

#[tokio::test]
async fn test_refresh_rejects_vanished_principal() {
    let (auth, directory) = seeded_service();
    let pair = auth.login("mariorossi", "test-pwd").await.unwrap();

    directory.remove_user("mariorossi");

    let result = auth.refresh(&pair.refresh_token).await;
    assert!(matches!(result, Err(AuthError::UnknownUser)));
}

#[tokio::test]
async fn test_refresh_rejects_undecodable_token() {
    let (auth, _) = seeded_service();
    let result = auth.refresh("not-a-jwt").await;
    assert!(matches!(
        result,
        Err(AuthError::Decode(DecodeError::Invalid))
    ));
}

#[tokio::test]
async fn test_is_authorized_propagates_decode_errors() {
    let (auth, _) = seeded_service();

    assert!(matches!(
        auth.is_authorized("not-a-jwt"),
        Err(AuthError::Decode(DecodeError::Invalid))
    ));
    assert!(matches!(
        auth.is_authorized(""),
        Err(AuthError::Decode(DecodeError::Unknown))
    ));
}

#[tokio::test]
async fn test_is_authorized_rejects_foreign_signature() {
    let (auth, _) = seeded_service();

    // a pair minted under a different secret never validates here
    let directory = MockDirectory::new();
    directory.seed_user("mariorossi", "test-pwd", &["user"]);
    let foreign = AuthService::new(
        AuthConfig::try_new("ffffffffffffffffffffffffffffffff").unwrap(),
        Arc::new(directory),
    );
    let pair = foreign.login("mariorossi", "test-pwd").await.unwrap();

    assert!(matches!(
        auth.is_authorized(&pair.access_token),
        Err(AuthError::Decode(DecodeError::Invalid))
    ));
}

#[tokio::test]
async fn test_is_admin_flags() {
    let (auth, _) = seeded_service();

    let user_pair = auth.login("mariorossi", "test-pwd").await.unwrap();
    let check = auth.is_admin(&user_pair.access_token).unwrap();
    assert!(check.authenticated);
    assert!(!check.admin);

    let admin_pair = auth.login("admin.user", "admin-pwd").await.unwrap();
    let check = auth.is_admin(&admin_pair.access_token).unwrap();
    assert!(check.authenticated);
    assert!(check.admin);
}

#[tokio::test]
async fn test_require_admin_forbids_plain_user() {
    let (auth, _) = seeded_service();
    let pair = auth.login("mariorossi", "test-pwd").await.unwrap();

    let result = auth.require_admin(&pair.access_token);
    assert!(matches!(result, Err(AuthError::Forbidden(Role::Admin))));
}

#[tokio::test]
async fn test_require_admin_accepts_admin() {
    let (auth, _) = seeded_service();
    let pair = auth.login("admin.user", "admin-pwd").await.unwrap();

    let claims = auth.require_admin(&pair.access_token).unwrap();
    assert_eq!(claims.username, "admin.user");
}

#[tokio::test]
async fn test_require_admin_rejects_refresh_token() {
    let (auth, _) = seeded_service();
    let pair = auth.login("admin.user", "admin-pwd").await.unwrap();

    // even an admin's refresh token is unauthenticated for access purposes
    let result = auth.require_admin(&pair.refresh_token);
    assert!(matches!(result, Err(AuthError::Unauthenticated)));
}

#[tokio::test]
async fn test_email_schema_variant_roundtrip() {
    let directory = MockDirectory::new();
    directory.seed_user("mariorossi", "test-pwd", &["user"]);

    let config = AuthConfig::try_new(SECRET)
        .unwrap()
        .with_required_email(true);
    let auth = AuthService::new(config, Arc::new(directory));

    let pair = auth.login("mariorossi", "test-pwd").await.unwrap();
    let check = auth.is_authorized(&pair.access_token).unwrap();
    assert!(check.authenticated);

    let claims = TokenClaims::from_raw(&check.claims).unwrap();
    assert_eq!(claims.email.as_deref(), Some("mariorossi@example.com"));
}

#[tokio::test]
async fn test_tokens_cross_schema_variants_fail_structure() {
    let directory = MockDirectory::new();
    directory.seed_user("mariorossi", "test-pwd", &["user"]);

    let base = service(directory.clone());
    let with_email = AuthService::new(
        AuthConfig::try_new(SECRET).unwrap().with_required_email(true),
        Arc::new(directory),
    );

    // a base-schema token is a subset for the email-requiring deployment
    let pair = base.login("mariorossi", "test-pwd").await.unwrap();
    let check = with_email.is_authorized(&pair.access_token).unwrap();
    assert!(!check.authenticated);

    // and the email-carrying token is a superset for the base deployment
    let pair = with_email.login("mariorossi", "test-pwd").await.unwrap();
    let check = base.is_authorized(&pair.access_token).unwrap();
    assert!(!check.authenticated);
}

#[tokio::test]
async fn test_short_ttl_access_token_expires() {
    let directory = MockDirectory::new();
    directory.seed_user("mariorossi", "test-pwd", &["user"]);

    let config = AuthConfig::try_new(SECRET)
        .unwrap()
        .with_access_ttl(Duration::from_secs(1));
    let auth = AuthService::new(config, Arc::new(directory));

    let pair = auth.login("mariorossi", "test-pwd").await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(matches!(
        auth.is_authorized(&pair.access_token),
        Err(AuthError::Decode(DecodeError::Expired))
    ));
}

#[test]
fn test_has_roles_is_reexported() {
    assert!(has_roles(&[Role::Admin, Role::User], &[Role::Admin]));
}
