use std::sync::Arc;

use async_trait::async_trait;
use infra::models::UserRow;

use crate::auth::config::EmergencyCredentials;
use crate::error::AppError;

/// Submitted username/password pair.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Read side of user persistence needed by the credentials provider.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError>;
}

#[derive(Clone)]
pub struct CredentialsAuthorizer {
    emergency: Option<EmergencyCredentials>,
    users: Arc<dyn UserStore>,
}

impl CredentialsAuthorizer {
    pub fn new(emergency: Option<EmergencyCredentials>, users: Arc<dyn UserStore>) -> Self {
        Self { emergency, users }
    }

    /// Check a login attempt against the emergency credentials.
    ///
    /// Returns `Ok(None)` when the pair does not match. A matching pair whose
    /// username is not the email of an existing user fails with
    /// [`AppError::UserNotFound`] instead, so a missing account surfaces as a
    /// server error rather than a rejected login.
    pub async fn authorize(&self, credentials: &Credentials) -> Result<Option<UserRow>, AppError> {
        let Some(emergency) = &self.emergency else {
            return Ok(None);
        };

        if credentials.username != emergency.username || credentials.password != emergency.password
        {
            tracing::info!("credentials login rejected");
            return Ok(None);
        }

        let user = self
            .users
            .find_user_by_email(&credentials.username)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::debug!(user_id = %user.id, "emergency credentials accepted");

        Ok(Some(user))
    }
}
