use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use molly_core::api::{build_router, AppState};
use molly_core::db::Database;
use molly_core::errors::MollyError;
use molly_core::llm::{LLMProvider, LLMResponse};
use molly_core::orchestrator::Orchestrator;
use molly_core::session::{AuthSessionManager, ChatSessionRegistry};

struct StubProvider;

#[async_trait]
impl LLMProvider for StubProvider {
    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<LLMResponse, MollyError> {
        Ok(LLMResponse {
            content: "Hello from the test double.".to_string(),
            input_tokens: None,
            output_tokens: None,
            cost_usd: None,
            model: "stub".to_string(),
        })
    }

    async fn complete_structured(&self, _prompt: &str, _schema: &Value, _system: Option<&str>) -> Result<Value, MollyError> {
        Ok(Value::Null)
    }

    fn provider_name(&self) -> &str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

fn create_test_state() -> AppState {
    let db = Database::in_memory().unwrap();
    let factory: molly_core::session::ProviderFactory = Arc::new(|| Box::new(StubProvider) as Box<dyn LLMProvider>);
    let chat_sessions = Arc::new(ChatSessionRegistry::new(factory));
    let reports_dir = tempfile::tempdir().unwrap().into_path();
    let orchestrator = Arc::new(Orchestrator::new(db.clone(), chat_sessions, reports_dir.clone()));

    AppState {
        db,
        orchestrator,
        auth_sessions: Arc::new(AuthSessionManager::new()),
        reports_dir,
    }
}

fn app(state: &AppState) -> axum::Router {
    build_router(state.clone())
}

fn make_request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    match body {
        Some(b) => builder.body(Body::from(serde_json::to_string(&b).unwrap())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::http::Response<Body>) -> Value {
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        panic!("empty response body. status: {}, headers: {:?}", parts.status, parts.headers);
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("JSON parse error: {}. Body: {:?}", e, String::from_utf8_lossy(&bytes)))
}

/// Logs in and returns the `session` cookie (name=value only, suitable for a
/// subsequent request's `Cookie` header).
async fn login_cookie(state: &AppState) -> String {
    let req = make_request("POST", "/api/login", None, Some(json!({ "user_id": "operator" })));
    let response = app(state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_root_endpoint_is_public() {
    let state = create_test_state();
    let req = make_request("GET", "/", None, None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "molly");
}

#[tokio::test]
async fn test_protected_route_without_cookie_is_unauthorized() {
    let state = create_test_state();
    let req = make_request("GET", "/api/scans", None, None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_then_list_scans() {
    let state = create_test_state();
    let cookie = login_cookie(&state).await;

    let req = make_request("GET", "/api/scans", Some(&cookie), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_chat_roundtrip_with_stub_provider() {
    let state = create_test_state();
    let cookie = login_cookie(&state).await;

    let req = make_request("POST", "/api/chat", Some(&cookie), Some(json!({ "message": "what can you do?" })));
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["response"], "Hello from the test double.");
    assert_eq!(body["session_status"], "authenticated");
}

#[tokio::test]
async fn test_check_scan_status_not_found() {
    let state = create_test_state();
    let cookie = login_cookie(&state).await;

    let req = make_request("GET", "/api/check_scan_status/999", Some(&cookie), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check_scan_status_reports_progress() {
    let state = create_test_state();
    state.db.create_scan("Escaneo_IA_test", "Network Scan", "10.0.0.0/24").unwrap();
    let cookie = login_cookie(&state).await;

    let req = make_request("GET", "/api/check_scan_status/1", Some(&cookie), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "in_progress");
    assert!(body["report_url"].is_null());
}

#[tokio::test]
async fn test_view_report_404_before_scan_completes() {
    let state = create_test_state();
    state.db.create_scan("Escaneo_IA_test", "Network Scan", "10.0.0.0/24").unwrap();
    let cookie = login_cookie(&state).await;

    let req = make_request("GET", "/view_report/1", Some(&cookie), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let state = create_test_state();
    let cookie = login_cookie(&state).await;

    let req = make_request("POST", "/api/logout", Some(&cookie), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = make_request("GET", "/api/scans", Some(&cookie), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
