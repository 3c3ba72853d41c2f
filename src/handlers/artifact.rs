//! Edge model artifact download
//!
//! Serves the quantized edge (TFLite) model produced by the training
//! export tooling. Bytes are read from disk once and cached in memory for
//! subsequent downloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;

use crate::error::AppError;
use crate::AppState;

const ATTACHMENT_NAME: &str = "ecg_model.tflite";

pub struct EdgeModelCache {
    path: PathBuf,
    bytes: RwLock<Option<Arc<Vec<u8>>>>,
}

impl EdgeModelCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bytes: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached artifact bytes, reading from disk on first use.
    pub fn fetch(&self) -> Result<Arc<Vec<u8>>, AppError> {
        if let Some(bytes) = self.bytes.read().clone() {
            return Ok(bytes);
        }

        if !self.path.exists() {
            return Err(AppError::NotFound("Edge model file not found".to_string()));
        }

        let bytes = std::fs::read(&self.path)
            .map_err(|e| AppError::ConversionError(e.to_string()))?;
        let bytes = Arc::new(bytes);

        *self.bytes.write() = Some(bytes.clone());
        tracing::info!(
            "Cached edge model artifact ({} bytes) from {}",
            bytes.len(),
            self.path.display()
        );
        Ok(bytes)
    }
}

/// GET /models/tflite/download
pub async fn download(State(state): State<AppState>) -> Result<Response, AppError> {
    let bytes = state.edge_model.fetch()?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", ATTACHMENT_NAME),
            ),
        ],
        bytes.to_vec(),
    )
        .into_response())
}
