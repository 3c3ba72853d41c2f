//! Encrypted inference endpoint
//!
//! Pipeline: decrypt envelope -> validate payload -> encode features ->
//! classify -> append event. Any pipeline failure is returned as a 200
//! `{"error": ...}` body unless strict status mapping is configured;
//! deployed clients always expect the 200 envelope.

use axum::{extract::State, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::models::{EcgFeatures, EncryptedEnvelope, PredictionEvent};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
}

pub async fn predict(
    State(state): State<AppState>,
    Json(envelope): Json<EncryptedEnvelope>,
) -> Response {
    match run_pipeline(&state, &envelope) {
        Ok(label) => Json(PredictResponse { prediction: label }).into_response(),
        Err(err) => {
            tracing::warn!("Predict pipeline failed: {}", err.message());
            if state.config.strict_predict_errors {
                err.into_response()
            } else {
                Json(json!({ "error": err.message() })).into_response()
            }
        }
    }
}

fn run_pipeline(state: &AppState, envelope: &EncryptedEnvelope) -> Result<String, AppError> {
    let payload = state.codec.decrypt_envelope(&envelope.data)?;
    let features = EcgFeatures::from_value(payload)?;

    let label = state.engine.classify(&features.to_vector())?;

    let event = PredictionEvent::new(features, label.clone());
    state.log.append(&event)?;

    tracing::debug!(
        prediction = %label,
        user_diagnosis = %event.user_diagnosis,
        matched = event.matched,
        "prediction logged"
    );

    Ok(label)
}
