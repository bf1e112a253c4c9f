use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::api::models::ScanStatusResponse;
use crate::api::AppState;
use crate::errors::MollyError;

pub async fn list_scans(State(state): State<AppState>) -> Result<Json<Value>, MollyError> {
    let scans = state.db.list_scans()?;
    Ok(Json(json!({ "scans": scans, "total": scans.len() })))
}

pub async fn check_scan_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ScanStatusResponse>, MollyError> {
    let scan = state
        .db
        .get_scan_by_id(id)?
        .ok_or_else(|| MollyError::NotFound(format!("scan {} not found", id)))?;

    let report_url = scan.results_path.as_ref().map(|_| format!("/view_report/{}", id));

    Ok(Json(ScanStatusResponse {
        status: scan.status.to_string(),
        summary: scan.summary,
        report_url,
    }))
}

pub async fn get_findings(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>, MollyError> {
    state
        .db
        .get_scan_by_id(id)?
        .ok_or_else(|| MollyError::NotFound(format!("scan {} not found", id)))?;
    let findings = state.db.get_findings_for_scan(id)?;
    Ok(Json(json!({ "findings": findings, "total": findings.len() })))
}

pub async fn get_hosts(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>, MollyError> {
    state
        .db
        .get_scan_by_id(id)?
        .ok_or_else(|| MollyError::NotFound(format!("scan {} not found", id)))?;
    let hosts = state.db.get_hosts_for_scan(id)?;
    Ok(Json(json!({ "hosts": hosts })))
}
