use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_status: &'static str,
    pub active_project: Option<String>,
}

#[derive(Serialize)]
pub struct SessionStatusResponse {
    pub status: &'static str,
    pub active_project: Option<String>,
}

#[derive(Serialize)]
pub struct ScanStatusResponse {
    pub status: String,
    pub summary: Option<String>,
    pub report_url: Option<String>,
}
