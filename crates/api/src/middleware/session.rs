use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::get_server_auth_session;
use crate::state::AppState;

/// Resolves the session cookie once per request and stores the [`Session`]
/// in the request extensions. Missing or invalid cookies leave the request
/// anonymous rather than failing it.
///
/// [`Session`]: crate::auth::Session
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(session) = get_server_auth_session(&state, request.headers()) {
        request.extensions_mut().insert(session);
    }

    next.run(request).await
}
