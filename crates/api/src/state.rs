use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::adapter::DbAdapter;
use crate::auth::providers::GITLAB_PROVIDER_ID;
use crate::auth::{
    AuthConfig, CredentialsAuthorizer, JwtService, OAuthService, ProviderRegistry, UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    auth_config: AuthConfig,
    providers: Arc<ProviderRegistry>,
    jwt_service: JwtService,
    oauth_service: OAuthService,
    adapter: DbAdapter,
    authorizer: CredentialsAuthorizer,
}

impl AppState {
    pub fn new(db: PgPool, auth_config: AuthConfig) -> anyhow::Result<Self> {
        let providers = ProviderRegistry::new(&auth_config);
        let gitlab = providers
            .oauth(GITLAB_PROVIDER_ID)
            .context("GitLab provider missing from registry")?;

        let jwt_service = JwtService::new(&auth_config);
        let oauth_service = OAuthService::new(auth_config.clone(), gitlab)?;
        let adapter = DbAdapter::new(db.clone());
        let authorizer =
            CredentialsAuthorizer::new(auth_config.emergency.clone(), Arc::new(adapter.clone()));

        Ok(Self {
            db,
            auth_config,
            providers: Arc::new(providers),
            jwt_service,
            oauth_service,
            adapter,
            authorizer,
        })
    }

    /// Swap the store the credentials authorizer loads users from.
    pub fn with_user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.authorizer = CredentialsAuthorizer::new(self.auth_config.emergency.clone(), users);
        self
    }

    pub fn from_env(db: PgPool) -> anyhow::Result<Self> {
        Self::new(db, AuthConfig::from_env()?)
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth_config
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn oauth_service(&self) -> &OAuthService {
        &self.oauth_service
    }

    pub fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    pub fn authorizer(&self) -> &CredentialsAuthorizer {
        &self.authorizer
    }
}
