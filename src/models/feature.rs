//! ECG feature record and pretrained-compatible encoding

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Number of model input features
pub const FEATURE_COUNT: usize = 8;

/// Encrypted request envelope
#[derive(Debug, Deserialize)]
pub struct EncryptedEnvelope {
    /// base64 encoded AES-CBC ciphertext
    pub data: String,
}

/// Decrypted feature payload. Field names follow the training dataset
/// columns; clients send them verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgFeatures {
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: f64,
    #[serde(rename = "PR_Interval")]
    pub pr_interval: f64,
    #[serde(rename = "QRS_Duration")]
    pub qrs_duration: f64,
    #[serde(rename = "ST_Segment")]
    pub st_segment: f64,
    #[serde(rename = "QTc_Interval")]
    pub qtc_interval: f64,
    #[serde(rename = "Electrical_Axis")]
    pub electrical_axis: f64,
    #[serde(rename = "Rhythm")]
    pub rhythm: String,
    #[serde(rename = "T_Wave")]
    pub t_wave: String,
    pub user_diagnosis: String,
}

impl EcgFeatures {
    /// Strict schema coercion of a decrypted JSON payload. Unknown fields
    /// are ignored; a missing or mistyped field surfaces by name.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(value).map_err(|e| AppError::ValidationError(e.to_string()))
    }

    /// Ordered model input vector. Order must match the training-time
    /// feature order exactly.
    pub fn to_vector(&self) -> [f32; FEATURE_COUNT] {
        [
            self.heart_rate as f32,
            self.pr_interval as f32,
            self.qrs_duration as f32,
            self.st_segment as f32,
            self.qtc_interval as f32,
            self.electrical_axis as f32,
            rhythm_code(&self.rhythm) as f32,
            twave_code(&self.t_wave) as f32,
        ]
    }
}

/// Categorical encoding, must match training. Unknown strings degrade to 0
/// rather than failing.
pub fn rhythm_code(rhythm: &str) -> u8 {
    match rhythm {
        "Sinus" => 0,
        "Bradycardia" => 1,
        "Tachycardia" => 2,
        "Atrial Fibrillation" => 3,
        _ => 0,
    }
}

pub fn twave_code(t_wave: &str) -> u8 {
    match t_wave {
        "Normal" => 0,
        "Inverted" => 1,
        "Peaked" => 2,
        "Flattened" => 3,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "Heart_Rate": 72.0,
            "PR_Interval": 160.0,
            "QRS_Duration": 90.0,
            "ST_Segment": 1.0,
            "QTc_Interval": 410.0,
            "Electrical_Axis": 60.0,
            "Rhythm": "Tachycardia",
            "T_Wave": "Inverted",
            "user_diagnosis": "Normal"
        })
    }

    #[test]
    fn vector_order_is_fixed() {
        let f = EcgFeatures::from_value(payload()).unwrap();
        assert_eq!(
            f.to_vector(),
            [72.0, 160.0, 90.0, 1.0, 410.0, 60.0, 2.0, 1.0]
        );
    }

    #[test]
    fn missing_field_names_the_offender() {
        let mut v = payload();
        v.as_object_mut().unwrap().remove("QTc_Interval");
        let err = EcgFeatures::from_value(v).unwrap_err();
        match err {
            AppError::ValidationError(msg) => assert!(msg.contains("QTc_Interval")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn wrong_type_is_a_validation_error() {
        let mut v = payload();
        v["Heart_Rate"] = json!("fast");
        assert!(matches!(
            EcgFeatures::from_value(v),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut v = payload();
        v["Comment"] = json!("taken at rest");
        assert!(EcgFeatures::from_value(v).is_ok());
    }

    #[test]
    fn unknown_categories_encode_to_zero() {
        assert_eq!(rhythm_code("Junctional"), 0);
        assert_eq!(twave_code("Biphasic"), 0);
        assert_eq!(rhythm_code(""), 0);
    }
}
