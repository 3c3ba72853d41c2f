//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// User table as a JSON blob: {"name": {"password": "...", "role": "..."}}
    pub users_json: String,

    /// Append-only prediction log (newline-delimited JSON)
    pub stats_log_path: String,

    /// Pretrained ONNX classifier
    pub model_path: String,

    /// StandardScaler parameters exported by the training pipeline
    pub scaler_path: String,

    /// Labeled reference dataset (CSV)
    pub dataset_path: String,

    /// Quantized edge model served via /models/tflite/download
    pub edge_model_path: String,

    /// AES-256 key for the transport envelope (32 bytes)
    pub cipher_key: Vec<u8>,

    /// AES-CBC initialization vector (16 bytes)
    pub cipher_iv: Vec<u8>,

    /// Map predict-path errors to real HTTP statuses instead of the
    /// legacy 200 error envelope
    pub strict_predict_errors: bool,
}

// Defaults match the existing deployment so clients encrypted against the
// old constants keep working. Hardcoded key material is a known weakness;
// production deployments must set CIPHER_KEY / CIPHER_IV.
const DEFAULT_USERS_JSON: &str = r#"{"admin": {"password": "admin123", "role": "admin"}, "demo": {"password": "demo", "role": "user"}}"#;
const DEFAULT_CIPHER_KEY: &str = "e4799ebc8be0f6bc973ab7fc966d6d4a";
const DEFAULT_CIPHER_IV: &str = "trEMHBkonQFqJAIA";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let cipher_key = env::var("CIPHER_KEY")
            .unwrap_or_else(|_| DEFAULT_CIPHER_KEY.to_string())
            .into_bytes();
        let cipher_iv = env::var("CIPHER_IV")
            .unwrap_or_else(|_| DEFAULT_CIPHER_IV.to_string())
            .into_bytes();

        if cipher_key.len() != 32 {
            anyhow::bail!("CIPHER_KEY must be exactly 32 bytes, got {}", cipher_key.len());
        }
        if cipher_iv.len() != 16 {
            anyhow::bail!("CIPHER_IV must be exactly 16 bytes, got {}", cipher_iv.len());
        }

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            users_json: env::var("USERS_JSON")
                .unwrap_or_else(|_| DEFAULT_USERS_JSON.to_string()),

            stats_log_path: env::var("STATS_LOG_PATH")
                .unwrap_or_else(|_| "logs/statistics.jsonl".to_string()),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "ecg_model.onnx".to_string()),

            scaler_path: env::var("SCALER_PATH")
                .unwrap_or_else(|_| "scaler.json".to_string()),

            dataset_path: env::var("DATASET_PATH")
                .unwrap_or_else(|_| "ecg_dataset.csv".to_string()),

            edge_model_path: env::var("EDGE_MODEL_PATH")
                .unwrap_or_else(|_| "ecg_model.tflite".to_string()),

            cipher_key,
            cipher_iv,

            strict_predict_errors: env::var("STRICT_PREDICT_ERRORS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}
