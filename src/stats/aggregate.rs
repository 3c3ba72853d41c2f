//! Streaming statistics aggregation
//!
//! Every summary request rescans the whole log; the aggregator keeps no
//! state between requests, so the log file stays the single source of
//! truth. Full-rescan semantics are the ground truth the tests pin down.

use std::collections::BTreeMap;
use std::io::BufRead;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

/// Correct/incorrect tally for one UTC date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateBucket {
    pub correct: u64,
    pub incorrect: u64,
}

/// One (user diagnosis, model prediction) disagreement pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionPair {
    pub user: String,
    pub model: String,
    pub count: u64,
}

/// Derived view over the log; recomputed fully on every read.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSummary {
    pub total: u64,
    pub accuracy: f64,
    pub by_diagnosis: BTreeMap<String, u64>,
    pub by_date: BTreeMap<String, DateBucket>,
    pub confusions: Vec<ConfusionPair>,
}

const TOP_CONFUSIONS: usize = 5;

/// Stream every line of the log and fold it into a summary. A line that
/// fails to parse is skipped; partial corruption never aborts the scan.
pub fn summarize(reader: Option<impl BufRead>) -> std::io::Result<StatisticsSummary> {
    let mut total = 0u64;
    let mut correct = 0u64;
    let mut by_diagnosis: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_date: BTreeMap<String, DateBucket> = BTreeMap::new();
    // Insertion-ordered so equal counts rank by first encounter
    let mut confusions: Vec<((String, String), u64)> = Vec::new();

    let Some(reader) = reader else {
        return Ok(finish(total, correct, by_diagnosis, by_date, confusions));
    };

    // Byte-wise split so a line with invalid UTF-8 is skipped like any
    // other unparseable line instead of aborting the scan
    for line in reader.split(b'\n') {
        let line = line?;
        let Ok(entry) = serde_json::from_slice::<serde_json::Value>(&line) else {
            continue;
        };
        if !entry.is_object() {
            continue;
        }

        total += 1;
        let matched = entry.get("match").and_then(|v| v.as_bool()).unwrap_or(false);
        if matched {
            correct += 1;
        }

        let user_diag = entry
            .get("user_diagnosis")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();
        let model_diag = entry
            .get("model_prediction")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();

        *by_diagnosis.entry(user_diag.clone()).or_insert(0) += 1;

        if let Some(date) = entry
            .get("timestamp")
            .and_then(|v| v.as_str())
            .and_then(utc_date)
        {
            let bucket = by_date.entry(date).or_default();
            if matched {
                bucket.correct += 1;
            } else {
                bucket.incorrect += 1;
            }
        }

        if user_diag != model_diag {
            let key = (user_diag, model_diag);
            match confusions.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) => *count += 1,
                None => confusions.push((key, 1)),
            }
        }
    }

    Ok(finish(total, correct, by_diagnosis, by_date, confusions))
}

fn finish(
    total: u64,
    correct: u64,
    by_diagnosis: BTreeMap<String, u64>,
    by_date: BTreeMap<String, DateBucket>,
    mut confusions: Vec<((String, String), u64)>,
) -> StatisticsSummary {
    let accuracy = if total > 0 {
        round4(correct as f64 / total as f64)
    } else {
        0.0
    };

    // Stable sort keeps first-encountered order among equal counts
    confusions.sort_by(|a, b| b.1.cmp(&a.1));
    let confusions = confusions
        .into_iter()
        .take(TOP_CONFUSIONS)
        .map(|((user, model), count)| ConfusionPair { user, model, count })
        .collect();

    StatisticsSummary {
        total,
        accuracy,
        by_diagnosis,
        by_date,
        confusions,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// ISO date of an event timestamp. Accepts RFC 3339 as well as the naive
/// ISO form older log lines carry.
fn utc_date(timestamp: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.date_naive().to_string());
    }
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date().to_string())
}
