use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

use crate::api::AppState;
use crate::errors::MollyError;
use crate::models::ScanStatus;
use crate::orchestrator::report_handler;

/// Serves a scan's PDF report inline, rendering it on first request if the
/// scan has finished but no report has been written yet. 404s on an unknown
/// or still-running scan.
pub async fn view_report(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, MollyError> {
    let scan = state
        .db
        .get_scan_by_id(id)?
        .ok_or_else(|| MollyError::NotFound(format!("scan {} not found", id)))?;

    if scan.status != ScanStatus::Completed {
        return Err(MollyError::NotFound(format!("scan {} has not finished", id)));
    }

    let path = match &scan.results_path {
        Some(path) if fs::metadata(path).await.is_ok() => path.clone(),
        _ => {
            let summary = scan.summary.clone().unwrap_or_default();
            report_handler::generate_network_summary_report(&state.db, &state.reports_dir, id, &summary)?
        }
    };

    let bytes = fs::read(&path)
        .await
        .map_err(|e| MollyError::Internal(format!("failed to read report file: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/pdf")],
        Body::from(bytes),
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct DetailedReportQuery {
    pub host_ip: String,
    pub session_name: String,
}

/// Builds an on-demand detailed per-host report and returns its path. Kept as
/// a JSON endpoint (distinct from `view_report`) since it is addressed by
/// host + session rather than by scan id.
pub async fn get_detailed_host_report(
    State(state): State<AppState>,
    Query(query): Query<DetailedReportQuery>,
) -> Result<Json<Value>, MollyError> {
    let path = report_handler::generate_detailed_host_report(
        &state.db,
        &state.reports_dir,
        &query.host_ip,
        &query.session_name,
    )?;
    Ok(Json(json!({ "report_path": path })))
}
