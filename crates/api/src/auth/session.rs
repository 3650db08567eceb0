use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{extract_cookie, session_cookie_name};
use crate::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

impl From<&Claims> for Session {
    fn from(claims: &Claims) -> Self {
        Self {
            user: SessionUser {
                id: claims.sub.clone(),
                name: claims.name.clone(),
                email: claims.email.clone(),
                image: claims.picture.clone(),
            },
            expires: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
        }
    }
}

/// Session bound to the request, or `None` when there is no valid session cookie.
pub fn get_server_auth_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let cookie_name = session_cookie_name(state.auth_config().cookie_secure);
    let token = extract_cookie(headers, &cookie_name)?;

    match state.jwt_service().verify_token(&token) {
        Ok(claims) => Some(Session::from(&claims)),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session cookie");
            None
        }
    }
}
