use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::json;

use super::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Pulls the opaque session token out of the `Cookie` header, without a
/// dedicated cookie-jar crate — the header format is simple enough
/// (`name=value; name2=value2`) to split by hand.
pub fn extract_cookie(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|part| {
        let (k, v) = part.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

/// Validates the `session` cookie against the shared `AuthSessionManager` and
/// stashes the token in request extensions so handlers can use it as the
/// conversation's chat id. Unlike a static API token, sessions expire after
/// their TTL and must be recreated via `/api/login`.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let token = extract_cookie(request.headers(), SESSION_COOKIE)
        .ok_or((StatusCode::UNAUTHORIZED, Json(json!({"error": "missing session cookie"}))))?;

    if !state.auth_sessions.validate_session(&token) {
        return Err((StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid or expired session"}))));
    }

    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}

#[derive(Clone)]
pub struct SessionToken(pub String);
