//! Classification engine - ONNX Runtime integration
//!
//! The session and scaler are loaded once at startup; a load failure is
//! fatal (the server refuses to serve without a model).

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::AppError;
use crate::models::FEATURE_COUNT;

use super::scaler::StandardScaler;

/// Diagnosis label table, index = model output class. Independent of the
/// categorical feature codes; must stay aligned with training label
/// encoding.
const LABELS: [&str; 6] = [
    "Atrial Fibrillation",
    "Bradycardia",
    "Heart Block",
    "Myocardial Infarction",
    "Normal",
    "Tachycardia",
];

/// Map a class index to its diagnosis label; out-of-range indices map to
/// "Unknown" rather than failing.
pub fn label_for(index: usize) -> &'static str {
    LABELS.get(index).copied().unwrap_or("Unknown")
}

/// First-occurrence argmax: ties go to the lowest index.
fn argmax(probs: &[f32]) -> usize {
    let mut best = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p > probs[best] {
            best = i;
        }
    }
    best
}

/// Engine status for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

pub struct InferenceEngine {
    session: RwLock<Session>,
    scaler: StandardScaler,
    model_name: String,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl InferenceEngine {
    pub fn load(model_path: &Path, scaler_path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            anyhow::bail!("model not found: {}", model_path.display());
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;

        let scaler = StandardScaler::load(scaler_path)?;

        tracing::info!("ONNX model and scaler loaded");

        Ok(Self {
            session: RwLock::new(session),
            scaler,
            model_name: model_path.display().to_string(),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        })
    }

    /// Normalize, run the classifier, and map the argmax class to a label.
    pub fn classify(&self, features: &[f32; FEATURE_COUNT]) -> Result<String, AppError> {
        let start = std::time::Instant::now();

        let scaled = self.scaler.transform(features);

        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), scaled.to_vec())
            .map_err(|e| AppError::InternalError(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| AppError::InternalError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.write();

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| AppError::InternalError("No model output defined".to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| AppError::InternalError(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| AppError::InternalError("No output tensor".to_string()))?;
        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::InternalError(format!("Extract error: {}", e)))?;
        let probs = tensor.1;

        if probs.is_empty() {
            return Err(AppError::InternalError("Empty probability vector".to_string()));
        }

        let class = argmax(probs);

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        Ok(label_for(class).to_string())
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        };

        EngineStatus {
            model_name: self.model_name.clone(),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}
