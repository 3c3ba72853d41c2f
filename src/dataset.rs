//! Labeled reference dataset
//!
//! CSV of training-distribution rows, loaded once at startup and read-only
//! while serving. Backs the random-sample endpoint.

use std::path::Path;

use rand::seq::SliceRandom;
use serde::Serialize;

/// One reference row. `diagnosis` is kept for filtering but not returned
/// to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRow {
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
    #[serde(skip)]
    pub diagnosis: String,
}

pub struct ReferenceDataset {
    rows: Vec<SampleRow>,
}

impl ReferenceDataset {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut lines = raw.lines();
        let header = lines
            .next()
            .ok_or_else(|| anyhow::anyhow!("dataset CSV is empty"))?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        let col = |name: &str| -> anyhow::Result<usize> {
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| anyhow::anyhow!("dataset missing column {}", name))
        };

        let heart_rate = col("Heart_Rate")?;
        let pr_interval = col("PR_Interval")?;
        let qrs_duration = col("QRS_Duration")?;
        let st_segment = col("ST_Segment")?;
        let qtc_interval = col("QTc_Interval")?;
        let electrical_axis = col("Electrical_Axis")?;
        let rhythm = col("Rhythm")?;
        let t_wave = col("T_Wave")?;
        let diagnosis = col("Diagnosis")?;

        let mut rows = Vec::new();
        for (lineno, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != columns.len() {
                anyhow::bail!(
                    "dataset row {} has {} fields, expected {}",
                    lineno + 2,
                    fields.len(),
                    columns.len()
                );
            }
            let num = |idx: usize| -> anyhow::Result<f64> {
                fields[idx]
                    .parse()
                    .map_err(|e| anyhow::anyhow!("dataset row {}: {}", lineno + 2, e))
            };
            rows.push(SampleRow {
                heart_rate: num(heart_rate)?,
                pr_interval: num(pr_interval)?,
                qrs_duration: num(qrs_duration)?,
                st_segment: num(st_segment)?,
                qtc_interval: num(qtc_interval)?,
                electrical_axis: num(electrical_axis)?,
                rhythm: fields[rhythm].to_string(),
                t_wave: fields[t_wave].to_string(),
                diagnosis: fields[diagnosis].to_string(),
            });
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Uniformly random reference row with the given diagnosis, or `None`
    /// if the dataset has no matching rows.
    pub fn random_sample(&self, diagnosis: &str) -> Option<&SampleRow> {
        let matching: Vec<&SampleRow> = self
            .rows
            .iter()
            .filter(|r| r.diagnosis == diagnosis)
            .collect();
        matching.choose(&mut rand::thread_rng()).copied()
    }
}
