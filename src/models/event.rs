//! Prediction event record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::feature::EcgFeatures;

/// One line of the append-only prediction log. Immutable once written;
/// only the whole log may be truncated, by an admin operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEvent {
    pub timestamp: DateTime<Utc>,
    pub input: EcgFeatures,
    pub model_prediction: String,
    pub user_diagnosis: String,
    #[serde(rename = "match")]
    pub matched: bool,
}

impl PredictionEvent {
    pub fn new(input: EcgFeatures, model_prediction: String) -> Self {
        let user_diagnosis = input.user_diagnosis.clone();
        let matched = model_prediction == user_diagnosis;
        Self {
            timestamp: Utc::now(),
            input,
            model_prediction,
            user_diagnosis,
            matched,
        }
    }
}
