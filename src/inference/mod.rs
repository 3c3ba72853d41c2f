//! Inference Dispatcher
//!
//! Scaler normalization + ONNX classification, loaded once at startup.

pub mod scaler;
pub mod engine;

pub use engine::{label_for, EngineStatus, InferenceEngine};
pub use scaler::StandardScaler;
