//! Provider registry.
//!
//! Assembled once from [`AuthConfig`] and shared read-only. Order is fixed:
//! the GitLab OAuth provider comes first, the credentials provider second.
//! Nothing here touches the network; bad endpoints or secrets only surface
//! once the OAuth client actually uses them.

use std::time::Duration;

use serde::Serialize;

use crate::auth::AuthConfig;

pub const GITLAB_PROVIDER_ID: &str = "gitlab";
pub const CREDENTIALS_PROVIDER_ID: &str = "credentials";

const GITLAB_HOST: &str = "https://gitlab.devops.telekom.de";
const GITLAB_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OAuth,
    Credentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProviderConfig {
    pub id: &'static str,
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorization_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scope: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsProviderConfig {
    pub id: &'static str,
    pub name: String,
    pub fields: Vec<CredentialField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    OAuth(OAuthProviderConfig),
    Credentials(CredentialsProviderConfig),
}

impl ProviderConfig {
    pub fn id(&self) -> &'static str {
        match self {
            ProviderConfig::OAuth(p) => p.id,
            ProviderConfig::Credentials(p) => p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProviderConfig::OAuth(p) => &p.name,
            ProviderConfig::Credentials(p) => &p.name,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::OAuth(_) => ProviderKind::OAuth,
            ProviderConfig::Credentials(_) => ProviderKind::Credentials,
        }
    }
}

/// Public view of a provider, served from `/api/auth/providers`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub signin_url: String,
    pub callback_url: String,
}

#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderConfig>,
}

impl ProviderRegistry {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            providers: vec![
                ProviderConfig::OAuth(gitlab(config)),
                ProviderConfig::Credentials(credentials()),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id() == id)
    }

    pub fn oauth(&self, id: &str) -> Option<&OAuthProviderConfig> {
        match self.get(id)? {
            ProviderConfig::OAuth(p) => Some(p),
            ProviderConfig::Credentials(_) => None,
        }
    }

    pub fn credentials(&self, id: &str) -> Option<&CredentialsProviderConfig> {
        match self.get(id)? {
            ProviderConfig::Credentials(p) => Some(p),
            ProviderConfig::OAuth(_) => None,
        }
    }

    pub fn summaries(&self, config: &AuthConfig) -> Vec<ProviderSummary> {
        self.providers
            .iter()
            .map(|p| ProviderSummary {
                id: p.id().to_string(),
                name: p.name().to_string(),
                kind: p.kind(),
                signin_url: config.auth_url(&format!("signin/{}", p.id())),
                callback_url: config.auth_url(&format!("callback/{}", p.id())),
            })
            .collect()
    }
}

fn gitlab(config: &AuthConfig) -> OAuthProviderConfig {
    OAuthProviderConfig {
        id: GITLAB_PROVIDER_ID,
        name: "Magenta CICD".to_string(),
        client_id: config.gitlab_client_id.clone(),
        client_secret: config.gitlab_client_secret.clone(),
        authorization_url: format!("{GITLAB_HOST}/oauth/authorize"),
        token_url: format!("{GITLAB_HOST}/oauth/token"),
        userinfo_url: format!("{GITLAB_HOST}/api/v4/user"),
        scope: "read_user".to_string(),
        timeout: GITLAB_TIMEOUT,
    }
}

fn credentials() -> CredentialsProviderConfig {
    CredentialsProviderConfig {
        id: CREDENTIALS_PROVIDER_ID,
        name: "Credentials".to_string(),
        fields: vec![
            CredentialField {
                name: "username",
                label: "Username",
                kind: FieldKind::Text,
                placeholder: Some(""),
            },
            CredentialField {
                name: "password",
                label: "Password",
                kind: FieldKind::Password,
                placeholder: None,
            },
        ],
    }
}
