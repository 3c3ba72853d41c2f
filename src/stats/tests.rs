use std::io::Write;

use tempfile::tempdir;

use super::log::EventLog;
use super::summarize;
use crate::models::{EcgFeatures, PredictionEvent};

fn features(diagnosis: &str) -> EcgFeatures {
    serde_json::from_value(serde_json::json!({
        "Heart_Rate": 72.0,
        "PR_Interval": 160.0,
        "QRS_Duration": 90.0,
        "ST_Segment": 1.0,
        "QTc_Interval": 410.0,
        "Electrical_Axis": 60.0,
        "Rhythm": "Sinus",
        "T_Wave": "Normal",
        "user_diagnosis": diagnosis
    }))
    .unwrap()
}

fn summary_of(log: &EventLog) -> super::StatisticsSummary {
    log.with_reader(|r| summarize(r)).unwrap()
}

#[test]
fn append_writes_one_line_per_event() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    log.append(&PredictionEvent::new(features("Normal"), "Normal".to_string()))
        .unwrap();
    log.append(&PredictionEvent::new(features("Tachycardia"), "Normal".to_string()))
        .unwrap();

    let content = std::fs::read_to_string(log.path()).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let event: PredictionEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.model_prediction, "Normal");
    }
}

#[test]
fn missing_log_summarizes_to_zero() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    let summary = summary_of(&log);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.accuracy, 0.0);
    assert!(summary.by_diagnosis.is_empty());
    assert!(summary.by_date.is_empty());
    assert!(summary.confusions.is_empty());
}

#[test]
fn one_hit_one_miss_scenario() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    // Fixed timestamps so the date bucket is deterministic
    let mut hit = PredictionEvent::new(features("Normal"), "Normal".to_string());
    hit.timestamp = "2024-01-01T10:00:00Z".parse().unwrap();
    let mut miss = PredictionEvent::new(features("Tachycardia"), "Bradycardia".to_string());
    miss.timestamp = "2024-01-01T11:00:00Z".parse().unwrap();

    log.append(&hit).unwrap();
    log.append(&miss).unwrap();

    let summary = summary_of(&log);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.accuracy, 0.5);

    let bucket = &summary.by_date["2024-01-01"];
    assert_eq!(bucket.correct, 1);
    assert_eq!(bucket.incorrect, 1);

    assert_eq!(summary.by_diagnosis["Normal"], 1);
    assert_eq!(summary.by_diagnosis["Tachycardia"], 1);

    assert_eq!(summary.confusions.len(), 1);
    assert_eq!(summary.confusions[0].user, "Tachycardia");
    assert_eq!(summary.confusions[0].model, "Bradycardia");
    assert_eq!(summary.confusions[0].count, 1);
}

#[test]
fn confusion_ranking_is_stable_for_ties() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    let mut push = |user: &str, model: &str| {
        log.append(&PredictionEvent::new(features(user), model.to_string()))
            .unwrap();
    };

    for _ in 0..3 {
        push("A", "B");
    }
    for _ in 0..3 {
        push("A", "C");
    }
    push("A", "D");

    let summary = summary_of(&log);
    let pairs: Vec<(&str, &str, u64)> = summary
        .confusions
        .iter()
        .map(|c| (c.user.as_str(), c.model.as_str(), c.count))
        .collect();

    // (A,B) first: equal count to (A,C) but encountered first
    assert_eq!(pairs, vec![("A", "B", 3), ("A", "C", 3), ("A", "D", 1)]);
}

#[test]
fn top_five_confusions_are_returned() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    for (i, model) in ["B", "C", "D", "E", "F", "G"].iter().enumerate() {
        // Descending counts: B six times ... G once
        for _ in 0..(6 - i) {
            log.append(&PredictionEvent::new(features("A"), model.to_string()))
                .unwrap();
        }
    }

    let summary = summary_of(&log);
    assert_eq!(summary.confusions.len(), 5);
    assert_eq!(summary.confusions[0].model, "B");
    assert_eq!(summary.confusions[0].count, 6);
    assert!(summary.confusions.iter().all(|c| c.model != "G"));
}

#[test]
fn corrupt_lines_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    log.append(&PredictionEvent::new(features("Normal"), "Normal".to_string()))
        .unwrap();
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap();
        writeln!(file, "{{ this is not json").unwrap();
    }
    log.append(&PredictionEvent::new(features("Normal"), "Normal".to_string()))
        .unwrap();

    let summary = summary_of(&log);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.accuracy, 1.0);
}

#[test]
fn summary_is_idempotent_without_writes() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    log.append(&PredictionEvent::new(features("Normal"), "Tachycardia".to_string()))
        .unwrap();

    let a = serde_json::to_value(summary_of(&log)).unwrap();
    let b = serde_json::to_value(summary_of(&log)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn erase_truncates_everything() {
    let dir = tempdir().unwrap();
    let log = EventLog::new(dir.path().join("statistics.jsonl")).unwrap();

    log.append(&PredictionEvent::new(features("Normal"), "Normal".to_string()))
        .unwrap();
    assert_eq!(summary_of(&log).total, 1);

    log.erase().unwrap();
    assert_eq!(summary_of(&log).total, 0);
    assert_eq!(std::fs::metadata(log.path()).unwrap().len(), 0);

    // Appends keep working after a truncation
    log.append(&PredictionEvent::new(features("Normal"), "Normal".to_string()))
        .unwrap();
    assert_eq!(summary_of(&log).total, 1);
}

#[test]
fn concurrent_appends_never_interleave() {
    let dir = tempdir().unwrap();
    let log = std::sync::Arc::new(EventLog::new(dir.path().join("statistics.jsonl")).unwrap());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let log = log.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..50 {
                log.append(&PredictionEvent::new(
                    features("Normal"),
                    "Normal".to_string(),
                ))
                .unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let content = std::fs::read_to_string(log.path()).unwrap();
    let mut parsed = 0;
    for line in content.lines() {
        serde_json::from_str::<PredictionEvent>(line).unwrap();
        parsed += 1;
    }
    assert_eq!(parsed, 400);
}
