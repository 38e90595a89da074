use bucket_core::classify::{classify_with, KeywordHitScorer};
use bucket_core::record::Record;
use bucket_core::rules::builtin;
use bucket_core::types::{CategoryCode, CategorySummary, GroupId, RunProgress, RunStatus};
use chrono::{TimeZone, Utc};
use serde_json::Value;

#[test]
fn golden_run_progress_serialization() {
    let main = GroupId::from("main");
    let mut summary = CategorySummary::new();
    summary.record(&main, &CategoryCode::from("HEALTH"));
    summary.record(&main, &CategoryCode::from("HEALTH"));
    summary.record(&main, &CategoryCode::from("DEFAULT"));

    let mut progress = RunProgress::started(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    progress.total_records = 3;
    progress.processed_records = 3;
    progress.pages_committed = 1;
    progress.status = RunStatus::Completed;
    progress.ended_at = Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 9).unwrap());
    progress
        .rules_fingerprints
        .insert(main.clone(), "sha256:00ff".to_string());
    progress.summary = summary;

    let json = serde_json::to_string(&progress).unwrap();
    // Field order is part of the contract.
    assert_eq!(
        json,
        concat!(
            r#"{"total_records":3,"processed_records":3,"pages_committed":1,"#,
            r#""status":"completed","started_at":"2024-01-02T03:04:05Z","#,
            r#""ended_at":"2024-01-02T03:04:09Z","last_error":null,"#,
            r#""rules_fingerprints":{"main":"sha256:00ff"},"#,
            r#""summary":{"main":{"DEFAULT":1,"HEALTH":2}}}"#
        )
    );

    assert_eq!(progress.elapsed(Utc::now()), Some(chrono::Duration::seconds(4)));

    let back: RunProgress = serde_json::from_str(&json).unwrap();
    assert_eq!(back, progress);
}

#[test]
fn golden_idle_progress_serialization() {
    let value: Value = serde_json::to_value(RunProgress::idle()).unwrap();
    assert_eq!(value["status"], "idle");
    assert_eq!(value["processed_records"], 0);
    assert!(value["started_at"].is_null());
    assert_eq!(value["summary"], serde_json::json!({}));
}

#[test]
fn golden_status_strings() {
    let statuses = [
        (RunStatus::Idle, "idle"),
        (RunStatus::Running, "running"),
        (RunStatus::Completed, "completed"),
        (RunStatus::Error, "error"),
    ];
    for (status, expected) in statuses {
        assert_eq!(serde_json::to_value(status).unwrap(), Value::from(expected));
    }
}

#[test]
fn golden_classification_serialization() {
    let group = builtin::main_group().unwrap();
    let rules = builtin::main_rules(&group).unwrap();

    let matched = classify_with(
        &KeywordHitScorer,
        &["Survival Summit Registrant".to_string()],
        &rules,
        &group,
    );
    assert_eq!(
        serde_json::to_string(&matched).unwrap(),
        r#"{"code":"BUSINESS_OPERATIONS","outcome":{"kind":"matched","score":1,"tied":["BUSINESS_OPERATIONS","SURVIVALIST"]}}"#
    );

    let untagged = classify_with(&KeywordHitScorer, &[], &rules, &group);
    assert_eq!(
        serde_json::to_string(&untagged).unwrap(),
        r#"{"code":"CANNOT_PLACE","outcome":{"kind":"no_tags"}}"#
    );
}

#[test]
fn golden_record_deserialization_defaults_categories() {
    let record: Record = serde_json::from_str(r#"{"id":"r1","tags":["keto"]}"#).unwrap();
    assert_eq!(record.id.as_str(), "r1");
    assert!(record.main_category.is_none());
    assert!(!record.is_assigned());

    let value = serde_json::to_value(&record).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 4);
}
