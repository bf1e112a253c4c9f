use axum::{extract::State, Extension, Json};

use crate::api::auth::SessionToken;
use crate::api::models::{ChatRequest, ChatResponse};
use crate::api::AppState;
use crate::errors::MollyError;

/// The session token doubles as the conversation's chat id: one authenticated
/// session holds exactly one `ConversationContext`.
pub async fn post_chat(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, MollyError> {
    let response = state.orchestrator.handle_query(&token.0, &req.message).await?;
    Ok(Json(ChatResponse {
        response,
        session_status: "authenticated",
        active_project: Some(token.0),
    }))
}
