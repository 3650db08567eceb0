use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;
/// Ten years.
pub const MAX_SESSION_MAX_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Username/password pair that unlocks the credentials provider.
#[derive(Clone)]
pub struct EmergencyCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for EmergencyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmergencyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Signs session tokens and CSRF cookies.
    pub secret: String,
    /// Public origin of this service, e.g. `https://app.example.com`.
    pub base_url: String,
    pub session_max_age: Duration,
    pub cookie_secure: bool,
    pub gitlab_client_id: String,
    pub gitlab_client_secret: String,
    /// `None` disables the credentials provider entirely.
    pub emergency: Option<EmergencyCredentials>,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("NEXTAUTH_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let emergency = match (env::var("EMERGENCY_USERNAME"), env::var("EMERGENCY_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(EmergencyCredentials { username, password })
            }
            _ => {
                tracing::warn!("EMERGENCY_USERNAME/EMERGENCY_PASSWORD not set, credentials login disabled");
                None
            }
        };

        Ok(Self {
            secret: env::var("NEXTAUTH_SECRET").context("NEXTAUTH_SECRET must be set")?,
            session_max_age: parse_session_max_age(
                env::var("SESSION_MAX_AGE_SECONDS").ok().as_deref(),
            )?,
            cookie_secure: env::var("COOKIE_SECURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| base_url.starts_with("https://")),
            gitlab_client_id: env::var("GITLAB_CLIENT_ID").context("GITLAB_CLIENT_ID must be set")?,
            gitlab_client_secret: env::var("GITLAB_CLIENT_SECRET")
                .context("GITLAB_CLIENT_SECRET must be set")?,
            emergency,
            base_url,
        })
    }

    /// Absolute URL for a path under the auth routes, e.g. `callback/gitlab`.
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/api/auth/{}", self.base_url, path)
    }
}

/// `SESSION_MAX_AGE_SECONDS`: unset means 30 days; anything else must be a
/// whole number of seconds between 1 and [`MAX_SESSION_MAX_AGE_SECS`].
pub fn parse_session_max_age(value: Option<&str>) -> Result<Duration> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(DEFAULT_SESSION_MAX_AGE_SECS));
    };

    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("SESSION_MAX_AGE_SECONDS is not a number: {:?}", value))?;
    if secs == 0 || secs > MAX_SESSION_MAX_AGE_SECS {
        bail!(
            "SESSION_MAX_AGE_SECONDS must be between 1 and {}, got {}",
            MAX_SESSION_MAX_AGE_SECS,
            secs
        );
    }

    Ok(Duration::from_secs(secs))
}
