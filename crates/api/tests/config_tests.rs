mod common;

use std::time::Duration;

use api::auth::config::{parse_session_max_age, MAX_SESSION_MAX_AGE_SECS};
use api::auth::oauth::token_expires_at;
use api::auth::Claims;
use api::error::AppError;
use common::*;

#[test]
fn test_session_max_age_defaults_to_thirty_days() {
    assert_eq!(
        parse_session_max_age(None).unwrap(),
        Duration::from_secs(30 * 24 * 60 * 60)
    );
    assert_eq!(
        parse_session_max_age(Some("3600")).unwrap(),
        Duration::from_secs(3600)
    );
}

#[test]
fn test_session_max_age_rejects_out_of_range_values() {
    assert!(parse_session_max_age(Some("0")).is_err());
    assert!(parse_session_max_age(Some("abc")).is_err());
    assert!(parse_session_max_age(Some("-5")).is_err());
    assert!(parse_session_max_age(Some("10000000000000000000")).is_err());

    let above = (MAX_SESSION_MAX_AGE_SECS + 1).to_string();
    assert!(parse_session_max_age(Some(&above)).is_err());

    let max = MAX_SESSION_MAX_AGE_SECS.to_string();
    assert_eq!(
        parse_session_max_age(Some(&max)).unwrap(),
        Duration::from_secs(MAX_SESSION_MAX_AGE_SECS)
    );
}

#[test]
fn test_huge_session_lifetime_is_an_error_not_a_panic() {
    let user = test_user(EMERGENCY_USERNAME);

    let result = Claims::new(&user, 10_000_000_000_000_000);
    assert!(matches!(result, Err(AppError::Internal(_))));

    let result = Claims::new(&user, u64::MAX);
    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[test]
fn test_token_expiry_is_checked() {
    assert_eq!(token_expires_at(1_000, Duration::from_secs(3600)), Some(4_600));
    assert_eq!(
        token_expires_at(i64::MAX - 10, Duration::from_secs(3600)),
        None
    );
    assert_eq!(token_expires_at(0, Duration::from_secs(u64::MAX)), None);
}
