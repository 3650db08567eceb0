mod common;

use std::sync::Arc;

use api::auth::{Credentials, CredentialsAuthorizer, EmergencyCredentials};
use api::error::AppError;
use common::*;

fn authorizer(store: Arc<InMemoryUsers>) -> CredentialsAuthorizer {
    CredentialsAuthorizer::new(test_config().emergency, store)
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_matching_credentials_return_existing_user() {
    let user = test_user(EMERGENCY_USERNAME);
    let store = Arc::new(InMemoryUsers::with_user(user.clone()));

    let result = authorizer(store.clone())
        .authorize(&credentials(EMERGENCY_USERNAME, EMERGENCY_PASSWORD))
        .await
        .expect("authorize should not fail");

    assert_eq!(result, Some(user), "user must be returned unmodified");
    assert_eq!(store.lookups(), 1);
}

#[tokio::test]
async fn test_wrong_password_returns_none() {
    let store = Arc::new(InMemoryUsers::with_user(test_user(EMERGENCY_USERNAME)));

    let result = authorizer(store.clone())
        .authorize(&credentials(EMERGENCY_USERNAME, "wrong"))
        .await
        .expect("authorize should not fail");

    assert!(result.is_none());
    assert_eq!(store.lookups(), 0, "rejected logins must not hit the store");
}

#[tokio::test]
async fn test_comparison_is_exact_and_case_sensitive() {
    let store = Arc::new(InMemoryUsers::with_user(test_user(EMERGENCY_USERNAME)));
    let authorizer = authorizer(store.clone());

    let attempts = [
        (EMERGENCY_USERNAME, "S3cret-Pa56"),
        (EMERGENCY_USERNAME, "s3cret-Pa55"),
        (EMERGENCY_USERNAME, "S3cret-Pa55 "),
        ("OPS@example.com", EMERGENCY_PASSWORD),
        ("ops@example.co", EMERGENCY_PASSWORD),
        ("", ""),
    ];

    for (username, password) in attempts {
        let result = authorizer
            .authorize(&credentials(username, password))
            .await
            .expect("authorize should not fail");
        assert!(
            result.is_none(),
            "{:?}/{:?} should be rejected",
            username,
            password
        );
    }
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_matching_credentials_without_user_fail_with_user_not_found() {
    let store = Arc::new(InMemoryUsers::default());

    let result = authorizer(store)
        .authorize(&credentials(EMERGENCY_USERNAME, EMERGENCY_PASSWORD))
        .await;

    match result {
        Err(err @ AppError::UserNotFound) => assert_eq!(err.to_string(), "User not found"),
        other => panic!("expected UserNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_user_with_other_email_is_not_returned() {
    let store = Arc::new(InMemoryUsers::with_user(test_user("someone@example.com")));

    let result = authorizer(store)
        .authorize(&credentials(EMERGENCY_USERNAME, EMERGENCY_PASSWORD))
        .await;

    assert!(matches!(result, Err(AppError::UserNotFound)));
}

#[tokio::test]
async fn test_store_errors_propagate() {
    let store = Arc::new(InMemoryUsers::failing());

    let result = authorizer(store)
        .authorize(&credentials(EMERGENCY_USERNAME, EMERGENCY_PASSWORD))
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn test_unconfigured_emergency_credentials_reject_everything() {
    let store = Arc::new(InMemoryUsers::with_user(test_user("")));
    let authorizer = CredentialsAuthorizer::new(None, store.clone());

    for (username, password) in [("", ""), (EMERGENCY_USERNAME, EMERGENCY_PASSWORD)] {
        let result = authorizer
            .authorize(&credentials(username, password))
            .await
            .expect("authorize should not fail");
        assert!(result.is_none());
    }
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_injected_credentials_are_used() {
    let user = test_user("admin@corp.example");
    let store = Arc::new(InMemoryUsers::with_user(user.clone()));
    let authorizer = CredentialsAuthorizer::new(
        Some(EmergencyCredentials {
            username: "admin@corp.example".to_string(),
            password: "hunter2".to_string(),
        }),
        store,
    );

    let accepted = authorizer
        .authorize(&credentials("admin@corp.example", "hunter2"))
        .await
        .expect("authorize should not fail");
    assert_eq!(accepted.map(|u| u.id), Some(user.id));

    let rejected = authorizer
        .authorize(&credentials(EMERGENCY_USERNAME, EMERGENCY_PASSWORD))
        .await
        .expect("authorize should not fail");
    assert!(rejected.is_none());
}
