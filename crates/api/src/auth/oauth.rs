use base64::{engine::general_purpose, Engine as _};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use oauth2::{AsyncHttpClient, HttpClientError, HttpResponse};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::auth::providers::OAuthProviderConfig;
use crate::auth::AuthConfig;
use crate::error::AppError;

/// Wrapper around reqwest 0.13 Client that implements oauth2's AsyncHttpClient trait.
/// oauth2 5.0 bundles its own reqwest 0.12 integration, but since we use reqwest 0.13,
/// we need a bridge implementation.
#[derive(Clone)]
struct OAuth2HttpClient(reqwest::Client);

impl<'c> AsyncHttpClient<'c> for OAuth2HttpClient {
    type Error = HttpClientError<reqwest::Error>;
    type Future =
        Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + Send + Sync + 'c>>;

    fn call(&'c self, request: oauth2::HttpRequest) -> Self::Future {
        Box::pin(async move {
            let method = request.method().clone();
            let url = request.uri().to_string();

            let mut req_builder = self.0.request(method, &url);
            for (name, value) in request.headers().iter() {
                req_builder = req_builder.header(name, value);
            }
            req_builder = req_builder.body(request.into_body());

            let response = req_builder.send().await.map_err(Box::new)?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(Box::new)?.to_vec();

            let mut builder = axum::http::Response::builder().status(status);
            for (name, value) in headers.iter() {
                builder = builder.header(name, value);
            }

            builder.body(body).map_err(HttpClientError::Http)
        })
    }
}

/// Subset of `GET /api/v4/user` we care about.
#[derive(Debug, Deserialize)]
pub struct GitLabUserInfo {
    pub id: i64,
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Provider-neutral profile handed to the adapter.
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
    pub provider_account_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

impl From<GitLabUserInfo> for OAuthUserInfo {
    fn from(profile: GitLabUserInfo) -> Self {
        Self {
            provider_account_id: profile.id.to_string(),
            name: profile.name.or(Some(profile.username)),
            email: profile.email,
            image: profile.avatar_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp, seconds.
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub scope: Option<String>,
}

/// Absolute expiry for a provider's `expires_in`; `None` when it does not fit.
pub fn token_expires_at(now: i64, expires_in: Duration) -> Option<i64> {
    i64::try_from(expires_in.as_secs())
        .ok()
        .and_then(|secs| now.checked_add(secs))
}

#[derive(Clone)]
pub struct OAuthService {
    config: AuthConfig,
    http_client: reqwest::Client,
    oauth2_client: OAuth2HttpClient,
}

impl OAuthService {
    /// The timeout applies to every call made on behalf of `provider`:
    /// token exchange and user-info.
    pub fn new(config: AuthConfig, provider: &OAuthProviderConfig) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(provider.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            oauth2_client: OAuth2HttpClient(http_client.clone()),
            http_client,
        })
    }

    /// Random opaque value for the `state` parameter.
    pub fn generate_state() -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>())
    }

    pub fn get_authorize_url(
        &self,
        provider: &OAuthProviderConfig,
        state: String,
    ) -> Result<String, AppError> {
        let redirect_url = self.config.auth_url(&format!("callback/{}", provider.id));

        let client = BasicClient::new(ClientId::new(provider.client_id.clone()))
            .set_auth_uri(
                AuthUrl::new(provider.authorization_url.clone())
                    .map_err(|e| AppError::Internal(format!("Invalid auth URL: {}", e)))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(redirect_url)
                    .map_err(|e| AppError::Internal(format!("Invalid redirect URL: {}", e)))?,
            );

        let (auth_url, _) = client
            .authorize_url(|| CsrfToken::new(state))
            .add_scope(Scope::new(provider.scope.clone()))
            .url();

        Ok(auth_url.to_string())
    }

    pub async fn exchange_code_for_user_info(
        &self,
        provider: &OAuthProviderConfig,
        code: String,
    ) -> Result<(OAuthUserInfo, OAuthTokens), AppError> {
        let redirect_url = self.config.auth_url(&format!("callback/{}", provider.id));

        let client = BasicClient::new(ClientId::new(provider.client_id.clone()))
            .set_client_secret(ClientSecret::new(provider.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(provider.authorization_url.clone())
                    .map_err(|e| AppError::Internal(format!("Invalid auth URL: {}", e)))?,
            )
            .set_token_uri(
                TokenUrl::new(provider.token_url.clone())
                    .map_err(|e| AppError::Internal(format!("Invalid token URL: {}", e)))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(redirect_url)
                    .map_err(|e| AppError::Internal(format!("Invalid redirect URL: {}", e)))?,
            );

        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&self.oauth2_client)
            .await
            .map_err(|e| AppError::Internal(format!("Token exchange failed: {}", e)))?;

        let tokens = OAuthTokens {
            access_token: token.access_token().secret().clone(),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            expires_at: token
                .expires_in()
                .and_then(|d| token_expires_at(chrono::Utc::now().timestamp(), d)),
            token_type: token.token_type().as_ref().to_string(),
            scope: token.scopes().map(|scopes| {
                scopes
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            }),
        };

        let profile = self
            .get_gitlab_user_info(provider, &tokens.access_token)
            .await?;
        tracing::debug!(provider = provider.id, account_id = profile.id, "fetched OAuth profile");

        Ok((profile.into(), tokens))
    }

    async fn get_gitlab_user_info(
        &self,
        provider: &OAuthProviderConfig,
        access_token: &str,
    ) -> Result<GitLabUserInfo, AppError> {
        let response = self
            .http_client
            .get(&provider.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Failed to fetch user info: {}",
                response.status()
            )));
        }

        response
            .json::<GitLabUserInfo>()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse user info: {}", e)))
    }
}
