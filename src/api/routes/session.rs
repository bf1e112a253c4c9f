use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::api::auth::{extract_cookie, SessionToken, SESSION_COOKIE};
use crate::api::models::LoginRequest;
use crate::api::AppState;

const SESSION_TTL_SECONDS: u64 = 6 * 60 * 60;

/// Creates an auth session for `user_id` and hands it back as an HttpOnly
/// cookie, matching the original's cookie-session model rather than a bearer
/// token returned in the response body.
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let token = state.auth_sessions.create_session(&req.user_id);

    let cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_COOKIE, token, SESSION_TTL_SECONDS
    );
    let mut response = Json(json!({ "status": "ok" })).into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).expect("cookie value is valid ASCII"));
    response
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    token: Option<Extension<SessionToken>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let token = token
        .map(|Extension(t)| t.0)
        .or_else(|| extract_cookie(&headers, SESSION_COOKIE))
        .ok_or(StatusCode::BAD_REQUEST)?;

    state.auth_sessions.end_session(&token);
    Ok(Json(json!({ "logged_out": true })))
}

pub async fn session_status(Extension(token): Extension<SessionToken>) -> Json<crate::api::models::SessionStatusResponse> {
    Json(crate::api::models::SessionStatusResponse {
        status: "authenticated",
        active_project: Some(token.0),
    })
}
