use chrono::{TimeDelta, Utc};
use infra::models::UserRow;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthConfig, Session};
use crate::error::AppError;

/// Payload of the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration
    pub jti: String,
}

impl Claims {
    pub fn new(user: &UserRow, max_age_secs: u64) -> Result<Self, AppError> {
        Self::issue(
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.image.clone(),
            max_age_secs,
        )
    }

    /// Same identity as an existing session, fresh expiry.
    pub fn from_session(session: &Session, max_age_secs: u64) -> Result<Self, AppError> {
        Self::issue(
            session.user.id.clone(),
            session.user.name.clone(),
            session.user.email.clone(),
            session.user.image.clone(),
            max_age_secs,
        )
    }

    fn issue(
        sub: String,
        name: Option<String>,
        email: Option<String>,
        picture: Option<String>,
        max_age_secs: u64,
    ) -> Result<Self, AppError> {
        let now = Utc::now();
        let exp = i64::try_from(max_age_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|max_age| now.checked_add_signed(max_age))
            .ok_or_else(|| {
                AppError::Internal(format!("Session max age out of range: {}s", max_age_secs))
            })?;

        Ok(Self {
            sub,
            name,
            email,
            picture,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_age_secs: u64,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            max_age_secs: config.session_max_age.as_secs(),
        }
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    pub fn create_token(&self, user: &UserRow) -> Result<String, AppError> {
        self.encode_claims(&Claims::new(user, self.max_age_secs)?)
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}
