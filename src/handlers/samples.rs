//! Reference sample handler

use axum::{extract::State, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DiagnosisRequest {
    pub diagnosis: String,
}

/// Random reference record for a diagnosis. Returns a 200 error envelope
/// when the dataset has no matching rows (same shape the predict endpoint
/// uses).
pub async fn random_sample(
    State(state): State<AppState>,
    Json(req): Json<DiagnosisRequest>,
) -> Response {
    match state.dataset.random_sample(&req.diagnosis) {
        Some(row) => Json(row).into_response(),
        None => Json(json!({ "error": "No samples found for that diagnosis" })).into_response(),
    }
}
