use async_trait::async_trait;
use infra::models::UserRow;
use infra::repos::{CreateUserData, LinkAccountData, UserRepo};
use sqlx::PgPool;

use crate::auth::credentials::UserStore;
use crate::auth::oauth::{OAuthTokens, OAuthUserInfo};
use crate::error::AppError;

pub enum OAuthSignIn {
    /// Account already linked.
    Existing(UserRow),
    /// First sign-in: user and account were created.
    Created(UserRow),
    /// The profile's email belongs to a user that never linked this provider.
    NotLinked,
}

/// Postgres-backed user/account storage.
#[derive(Clone)]
pub struct DbAdapter {
    db: PgPool,
}

impl DbAdapter {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn sign_in_oauth(
        &self,
        provider: &str,
        profile: OAuthUserInfo,
        tokens: OAuthTokens,
    ) -> Result<OAuthSignIn, AppError> {
        let users = UserRepo::new(self.db.clone());

        if let Some(user) = users
            .get_by_account(provider, &profile.provider_account_id)
            .await?
        {
            return Ok(OAuthSignIn::Existing(user));
        }

        if let Some(email) = &profile.email {
            if users.get_by_email(email).await?.is_some() {
                tracing::warn!(provider, "OAuth email already used by an unlinked user");
                return Ok(OAuthSignIn::NotLinked);
            }
        }

        let (user, _account) = users
            .create_with_account(
                CreateUserData {
                    name: profile.name,
                    email: profile.email,
                    image: profile.image,
                },
                &LinkAccountData {
                    kind: "oauth".to_string(),
                    provider: provider.to_string(),
                    provider_account_id: profile.provider_account_id,
                    access_token: Some(tokens.access_token),
                    refresh_token: tokens.refresh_token,
                    expires_at: tokens.expires_at,
                    token_type: Some(tokens.token_type),
                    scope: tokens.scope,
                },
            )
            .await?;

        tracing::info!(user_id = %user.id, provider, "created user from OAuth sign-in");
        Ok(OAuthSignIn::Created(user))
    }
}

#[async_trait]
impl UserStore for DbAdapter {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(UserRepo::new(self.db.clone()).get_by_email(email).await?)
    }
}
