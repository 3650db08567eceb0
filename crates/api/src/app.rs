use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::State,
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::session::session_middleware;
use crate::routes::auth;
use crate::state::AppState;

/// Build the Axum router with the `/api/auth` surface and a health endpoint.
///
/// The credentials callback is rate limited per peer IP, so the router must be
/// served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Rate limiting: 10 requests per minute per IP on the credentials login
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(6) // 1 token every 6 seconds = ~10/min
        .burst_size(10)
        .finish()
        .context("invalid rate limit configuration")?;

    let rate_limited_routes = Router::new()
        .route(
            "/api/auth/callback/credentials",
            post(auth::credentials_callback),
        )
        .layer(GovernorLayer::new(Arc::new(governor_conf)));

    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| state.auth_config().base_url.clone());
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|o| o.trim().parse().ok())
        .collect();

    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/auth/providers", get(auth::providers))
        .route("/api/auth/csrf", get(auth::csrf_token))
        .route("/api/auth/signin", get(auth::signin_page))
        .route("/api/auth/signin/{provider}", get(auth::signin))
        .route("/api/auth/callback/{provider}", get(auth::oauth_callback))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/error", get(auth::error))
        .merge(rate_limited_routes)
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, session_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                .allow_credentials(true),
        ))
}

/// Liveness + quick DB round-trip.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let _one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok("ok")
}
