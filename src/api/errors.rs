use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::errors::MollyError;

impl IntoResponse for MollyError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            MollyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MollyError::Config(_) => StatusCode::BAD_REQUEST,
            MollyError::Authentication(_) => StatusCode::UNAUTHORIZED,
            MollyError::NotFound(_) => StatusCode::NOT_FOUND,
            MollyError::DuplicateSession(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
