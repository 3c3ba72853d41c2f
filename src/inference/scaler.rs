//! StandardScaler normalization
//!
//! Parameters come from a JSON sidecar exported by the training pipeline
//! (per-feature mean and scale, in training feature order).

use std::path::Path;

use serde::Deserialize;

use crate::models::FEATURE_COUNT;

#[derive(Debug, Deserialize)]
struct ScalerParams {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: [f32; FEATURE_COUNT],
    scale: [f32; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let params: ScalerParams = serde_json::from_str(&raw)?;
        Self::from_params(params.mean, params.scale)
    }

    pub fn from_params(mean: Vec<f32>, scale: Vec<f32>) -> anyhow::Result<Self> {
        if mean.len() != FEATURE_COUNT || scale.len() != FEATURE_COUNT {
            anyhow::bail!(
                "scaler expects {} features, got mean={} scale={}",
                FEATURE_COUNT,
                mean.len(),
                scale.len()
            );
        }
        let mut m = [0.0f32; FEATURE_COUNT];
        let mut s = [1.0f32; FEATURE_COUNT];
        m.copy_from_slice(&mean);
        s.copy_from_slice(&scale);
        Ok(Self { mean: m, scale: s })
    }

    /// (x - mean) / scale, per feature
    pub fn transform(&self, features: &[f32; FEATURE_COUNT]) -> [f32; FEATURE_COUNT] {
        let mut out = [0.0f32; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let scale = self.scale[i].abs().max(1e-8);
            out[i] = (features[i] - self.mean[i]) / scale;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_centers_and_scales() {
        let scaler = StandardScaler::from_params(
            vec![10.0; FEATURE_COUNT],
            vec![2.0; FEATURE_COUNT],
        )
        .unwrap();
        let out = scaler.transform(&[12.0; FEATURE_COUNT]);
        assert_eq!(out, [1.0; FEATURE_COUNT]);
    }

    #[test]
    fn zero_scale_does_not_divide_by_zero() {
        let scaler = StandardScaler::from_params(
            vec![0.0; FEATURE_COUNT],
            vec![0.0; FEATURE_COUNT],
        )
        .unwrap();
        let out = scaler.transform(&[1.0; FEATURE_COUNT]);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(StandardScaler::from_params(vec![0.0; 3], vec![1.0; 3]).is_err());
    }
}
