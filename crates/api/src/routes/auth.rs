use axum::{
    extract::{Form, Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::auth::adapter::OAuthSignIn;
use crate::auth::cookie::{
    build_clear_cookie, build_cookie, csrf_cookie_name, extract_cookie, session_cookie_name,
    state_cookie_name, STATE_MAX_AGE_SECS,
};
use crate::auth::providers::{ProviderConfig, CREDENTIALS_PROVIDER_ID};
use crate::auth::{csrf, Claims, Credentials, OAuthService, Session};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SignInQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}

/// GET /api/auth/providers
pub async fn providers(State(state): State<AppState>) -> Result<Json<Map<String, Value>>, AppError> {
    let mut providers = Map::new();
    for summary in state.providers().summaries(state.auth_config()) {
        let value = serde_json::to_value(&summary)
            .map_err(|e| AppError::Internal(format!("Failed to serialize provider: {}", e)))?;
        providers.insert(summary.id, value);
    }
    Ok(Json(providers))
}

/// GET /api/auth/csrf
pub async fn csrf_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (token, cookie) = ensure_csrf(&state, &headers);
    let response = Json(CsrfResponse { csrf_token: token }).into_response();
    with_cookies(response, cookie.iter())
}

/// GET /api/auth/signin
///
/// One link per OAuth provider, one form per credentials provider.
pub async fn signin_page(
    State(state): State<AppState>,
    Query(query): Query<SignInQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (token, cookie) = ensure_csrf(&state, &headers);
    let config = state.auth_config();
    let callback_url = query.callback_url.unwrap_or_else(|| config.base_url.clone());

    let error_html = match query.error.as_deref() {
        Some(error) => format!(r#"<p class="error">{}</p>"#, encode_text(&error_message(error))),
        None => String::new(),
    };

    let mut sections = Vec::new();
    for provider in state.providers().iter() {
        match provider {
            ProviderConfig::OAuth(oauth) => {
                let href = config.auth_url(&format!("signin/{}", oauth.id));
                sections.push(format!(
                    r#"<div class="provider"><a class="button" href="{}">Sign in with {}</a></div>"#,
                    encode_double_quoted_attribute(&href),
                    encode_text(&oauth.name)
                ));
            }
            ProviderConfig::Credentials(creds) => {
                let fields: String = creds
                    .fields
                    .iter()
                    .map(|field| {
                        let kind = serde_json::to_value(field.kind)
                            .ok()
                            .and_then(|v| v.as_str().map(str::to_string))
                            .unwrap_or_else(|| "text".to_string());
                        format!(
                            r#"
                <div class="form-group">
                    <label for="{name}">{label}</label>
                    <input type="{kind}" id="{name}" name="{name}" placeholder="{placeholder}" required>
                </div>"#,
                            name = encode_double_quoted_attribute(field.name),
                            label = encode_text(field.label),
                            kind = kind,
                            placeholder =
                                encode_double_quoted_attribute(field.placeholder.unwrap_or("")),
                        )
                    })
                    .collect();

                sections.push(format!(
                    r#"<form class="provider" method="post" action="{action}">
                <input type="hidden" name="csrfToken" value="{csrf}">
                <input type="hidden" name="callbackUrl" value="{callback}">{fields}
                <button type="submit">Sign in with {name}</button>
            </form>"#,
                    action = encode_double_quoted_attribute(
                        &config.auth_url(&format!("callback/{}", creds.id))
                    ),
                    csrf = encode_double_quoted_attribute(&token),
                    callback = encode_double_quoted_attribute(&callback_url),
                    fields = fields,
                    name = encode_text(&creds.name),
                ));
            }
        }
    }

    let page = format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Sign in</title>
            <style>
                body {{ font-family: Arial, sans-serif; max-width: 400px; margin: 50px auto; padding: 20px; }}
                .provider {{ margin-bottom: 30px; }}
                .form-group {{ margin-bottom: 15px; }}
                .error {{ color: #c00; }}
                label {{ display: block; margin-bottom: 5px; }}
                input {{ width: 100%; padding: 8px; border: 1px solid #ddd; border-radius: 4px; }}
                button, .button {{ background: #e20074; color: white; padding: 10px 20px; border: none; border-radius: 4px; cursor: pointer; text-decoration: none; }}
            </style>
        </head>
        <body>
            <h2>Sign in</h2>
            {error_html}
            {providers}
        </body>
        </html>
        "#,
        providers = sections.join("\n            "),
    );

    with_cookies(Html(page).into_response(), cookie.iter())
}

/// GET /api/auth/signin/{provider}
pub async fn signin(
    State(state): State<AppState>,
    Path(provider_id): Path<String>,
) -> Result<Response, AppError> {
    let provider = state
        .providers()
        .get(&provider_id)
        .ok_or_else(|| AppError::BadRequest("Invalid provider".to_string()))?;

    let oauth = match provider {
        ProviderConfig::OAuth(oauth) => oauth,
        ProviderConfig::Credentials(_) => {
            return Ok(Redirect::to(&state.auth_config().auth_url("signin")).into_response());
        }
    };

    let oauth_state = OAuthService::generate_state();
    let auth_url = state
        .oauth_service()
        .get_authorize_url(oauth, oauth_state.clone())?;

    let secure = state.auth_config().cookie_secure;
    let cookie = build_cookie(
        &state_cookie_name(secure),
        &oauth_state,
        Some(STATE_MAX_AGE_SECS),
        secure,
    );

    tracing::info!(provider = oauth.id, "redirecting to OAuth provider");
    with_cookies(Redirect::to(&auth_url).into_response(), [&cookie])
}

/// GET /api/auth/callback/{provider}
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider_id): Path<String>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let oauth = state
        .providers()
        .oauth(&provider_id)
        .ok_or_else(|| AppError::BadRequest("Invalid OAuth provider".to_string()))?;
    let config = state.auth_config();
    let secure = config.cookie_secure;

    if let Some(error) = query.error {
        tracing::warn!(provider = oauth.id, error = %error, "OAuth provider returned an error");
        return Ok(redirect_to_error(&state, "OAuthCallback").into_response());
    }

    let expected_state = extract_cookie(&headers, &state_cookie_name(secure));
    if expected_state.is_none() || expected_state != query.state {
        return Err(AppError::Unauthorized("Invalid OAuth state".to_string()));
    }

    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let (profile, tokens) = state
        .oauth_service()
        .exchange_code_for_user_info(oauth, code)
        .await?;

    let user = match state
        .adapter()
        .sign_in_oauth(oauth.id, profile, tokens)
        .await?
    {
        OAuthSignIn::Existing(user) | OAuthSignIn::Created(user) => user,
        OAuthSignIn::NotLinked => {
            return Ok(redirect_to_error(&state, "OAuthAccountNotLinked").into_response());
        }
    };

    let token = state.jwt_service().create_token(&user)?;
    let session_cookie = build_cookie(
        &session_cookie_name(secure),
        &token,
        Some(state.jwt_service().max_age_secs()),
        secure,
    );
    let clear_state = build_clear_cookie(&state_cookie_name(secure), secure);

    tracing::info!(user_id = %user.id, provider = oauth.id, "signed in");
    with_cookies(
        Redirect::to(&config.base_url).into_response(),
        [&session_cookie, &clear_state],
    )
}

/// POST /api/auth/callback/credentials
pub async fn credentials_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let config = state.auth_config();
    let secure = config.cookie_secure;

    let csrf_ok = extract_cookie(&headers, &csrf_cookie_name(secure))
        .is_some_and(|cookie| csrf::verify(&cookie, &form.csrf_token, &config.secret));
    if !csrf_ok {
        return Err(AppError::Unauthorized("MissingCSRF".to_string()));
    }

    let credentials = Credentials {
        username: form.username,
        password: form.password,
    };

    let user = state
        .authorizer()
        .authorize(&credentials)
        .await?
        .ok_or_else(|| AppError::Unauthorized("CredentialsSignin".to_string()))?;

    let token = state.jwt_service().create_token(&user)?;
    let cookie = build_cookie(
        &session_cookie_name(secure),
        &token,
        Some(state.jwt_service().max_age_secs()),
        secure,
    );

    tracing::info!(user_id = %user.id, provider = CREDENTIALS_PROVIDER_ID, "signed in");
    let target = safe_redirect(&config.base_url, form.callback_url.as_deref());
    with_cookies(Redirect::to(&target).into_response(), [&cookie])
}

/// GET /api/auth/session
///
/// Returns `{}` without a session. A valid session is re-issued with a
/// fresh expiry so active users stay signed in.
pub async fn session(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
) -> Result<Response, AppError> {
    let Some(Extension(session)) = session else {
        return Ok(Json(json!({})).into_response());
    };

    let secure = state.auth_config().cookie_secure;
    let jwt = state.jwt_service();
    let claims = Claims::from_session(&session, jwt.max_age_secs())?;
    let token = jwt.encode_claims(&claims)?;
    let cookie = build_cookie(
        &session_cookie_name(secure),
        &token,
        Some(jwt.max_age_secs()),
        secure,
    );

    with_cookies(Json(Session::from(&claims)).into_response(), [&cookie])
}

/// POST /api/auth/signout
pub async fn signout(State(state): State<AppState>) -> Result<Response, AppError> {
    let config = state.auth_config();
    let cookie = build_clear_cookie(&session_cookie_name(config.cookie_secure), config.cookie_secure);
    with_cookies(Redirect::to(&config.base_url).into_response(), [&cookie])
}

/// GET /api/auth/error
pub async fn error(Query(query): Query<ErrorQuery>) -> Json<Value> {
    let error = query.error.unwrap_or_else(|| "Default".to_string());
    Json(json!({ "error": error, "message": error_message(&error) }))
}

/// Reuse the token of a valid CSRF cookie, otherwise mint a new one and
/// return the cookie to set.
fn ensure_csrf(state: &AppState, headers: &HeaderMap) -> (String, Option<String>) {
    let config = state.auth_config();
    let name = csrf_cookie_name(config.cookie_secure);

    if let Some(token) = extract_cookie(headers, &name)
        .and_then(|value| csrf::token_from_cookie(&value, &config.secret))
    {
        return (token, None);
    }

    let (token, value) = csrf::generate(&config.secret);
    let cookie = build_cookie(&name, &value, None, config.cookie_secure);
    (token, Some(cookie))
}

fn redirect_to_error(state: &AppState, error: &str) -> Redirect {
    let url = format!(
        "{}?error={}",
        state.auth_config().auth_url("error"),
        urlencoding::encode(error)
    );
    Redirect::to(&url)
}

fn error_message(error: &str) -> String {
    match error {
        "CredentialsSignin" => "Sign in failed. Check the details you provided are correct.",
        "OAuthAccountNotLinked" => {
            "To confirm your identity, sign in with the same account you used originally."
        }
        "OAuthCallback" => "Try signing in with a different account.",
        _ => "Unable to sign in.",
    }
    .to_string()
}

/// Only same-origin targets are honoured; anything else falls back to `base_url`.
pub fn safe_redirect(base_url: &str, callback_url: Option<&str>) -> String {
    let Some(callback) = callback_url.filter(|c| !c.is_empty()) else {
        return base_url.to_string();
    };

    if callback.starts_with('/') && !callback.starts_with("//") {
        return format!("{}{}", base_url, callback);
    }

    match (url::Url::parse(base_url), url::Url::parse(callback)) {
        (Ok(base), Ok(target)) if base.origin() == target.origin() => target.to_string(),
        _ => base_url.to_string(),
    }
}

fn with_cookies<'a>(
    mut response: Response,
    cookies: impl IntoIterator<Item = &'a String>,
) -> Result<Response, AppError> {
    for cookie in cookies {
        response.headers_mut().append(
            SET_COOKIE,
            cookie
                .parse()
                .map_err(|_| AppError::Internal("Failed to build cookie header".to_string()))?,
        );
    }
    Ok(response)
}
