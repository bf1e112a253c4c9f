pub mod auth;
pub mod errors;
pub mod models;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::errors::MollyError;
use crate::llm::create_provider;
use crate::orchestrator::Orchestrator;
use crate::session::{AuthSessionManager, ChatSessionRegistry};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub orchestrator: Arc<Orchestrator>,
    pub auth_sessions: Arc<AuthSessionManager>,
    pub reports_dir: PathBuf,
}

/// Wires the database, a lazily-constructed per-chat LLM provider factory and
/// the operator auth-session registry into the state every route shares.
pub async fn create_app_state(
    db_path: &str,
    reports_dir: PathBuf,
    provider_name: String,
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
) -> Result<AppState, MollyError> {
    let db = Database::new(db_path)?;

    let factory: crate::session::ProviderFactory = Arc::new(move || {
        create_provider(&provider_name, &api_key, model.as_deref(), base_url.as_deref())
            .expect("configured LLM provider failed to construct")
    });
    let chat_sessions = Arc::new(ChatSessionRegistry::new(factory));
    let orchestrator = Arc::new(Orchestrator::new(db.clone(), chat_sessions, reports_dir.clone()));
    let auth_sessions = Arc::new(AuthSessionManager::new());

    Ok(AppState { db, orchestrator, auth_sessions, reports_dir })
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/chat", post(routes::chat::post_chat))
        .route("/api/check_scan_status/{id}", get(routes::scans::check_scan_status))
        .route("/api/session_status", get(routes::session::session_status))
        .route("/api/scans", get(routes::scans::list_scans))
        .route("/api/scans/{id}/findings", get(routes::scans::get_findings))
        .route("/api/scans/{id}/hosts", get(routes::scans::get_hosts))
        .route("/view_report/{id}", get(routes::reports::view_report))
        .route("/api/reports/host", get(routes::reports::get_detailed_host_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::session_auth_middleware));

    Router::new()
        .route("/", get(routes::health::root))
        .route("/api/login", post(routes::session::login))
        .route("/api/logout", post(routes::session::logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
