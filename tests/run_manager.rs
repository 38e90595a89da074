use std::sync::Arc;

use bucket_core::batch::{BatchConfig, ManagerError, RetentionPolicy, RunManager};
use bucket_core::classify::{Classifier, GroupRules};
use bucket_core::record::{InMemoryRecordStore, Record, RecordId};
use bucket_core::rules::builtin;
use bucket_core::rules::KeywordRuleSet;
use bucket_core::types::{GroupId, RunId, RunStatus};
use chrono::{Duration, Utc};

fn make_store(n: usize) -> Arc<InMemoryRecordStore> {
    let records = (0..n)
        .map(|i| {
            let tags = if i % 2 == 0 {
                vec!["Keto Summit".to_string()]
            } else {
                vec!["Bunker Tour".to_string()]
            };
            Record::new(RecordId::new(format!("r{i}")), tags)
        })
        .collect();
    Arc::new(InMemoryRecordStore::with_records(records).unwrap())
}

fn make_manager(store: Arc<InMemoryRecordStore>, retention: RetentionPolicy) -> RunManager {
    RunManager::new(
        store,
        Arc::new(Classifier::builtin().unwrap()),
        BatchConfig::with_batch_size(20),
        retention,
    )
    .unwrap()
}

#[tokio::test]
async fn started_run_completes_in_background() {
    let manager = make_manager(make_store(50), RetentionPolicy::default());

    let id = manager.start().unwrap();
    let done = manager.wait(&id).await.unwrap();

    assert_eq!(done.status, RunStatus::Completed);
    assert_eq!(done.processed_records, 50);
    assert_eq!(done.pages_committed, 3);
    assert_eq!(manager.progress(&id).unwrap(), done);
    assert_eq!(manager.run_ids(), vec![id]);
    assert_eq!(id.as_uuid().get_version_num(), 4);

    // Waiting again returns the same final snapshot.
    assert_eq!(manager.wait(&id).await.unwrap(), done);
}

#[tokio::test]
async fn cancelled_run_ends_in_error() {
    let manager = make_manager(make_store(50), RetentionPolicy::default());

    // The spawned task has not been polled yet on this single-threaded runtime.
    let id = manager.start().unwrap();
    manager.cancel(&id).unwrap();

    let done = manager.wait(&id).await.unwrap();
    assert_eq!(done.status, RunStatus::Error);
    assert_eq!(done.last_error.as_deref(), Some("run cancelled"));
    assert_eq!(done.processed_records, 0);
}

#[tokio::test]
async fn unknown_run_ids_are_reported() {
    let manager = make_manager(make_store(1), RetentionPolicy::default());
    let ghost = RunId::generate();

    assert!(matches!(manager.progress(&ghost), Err(ManagerError::UnknownRun(id)) if id == ghost));
    assert!(matches!(manager.cancel(&ghost), Err(ManagerError::UnknownRun(_))));
    assert!(matches!(manager.wait(&ghost).await, Err(ManagerError::UnknownRun(_))));
}

#[test]
fn start_outside_a_runtime_fails() {
    let manager = make_manager(make_store(1), RetentionPolicy::default());
    assert!(matches!(manager.start(), Err(ManagerError::NoRuntime)));
    assert!(manager.run_ids().is_empty());
}

#[test]
fn zero_retention_is_rejected() {
    let result = RunManager::new(
        make_store(1),
        Arc::new(Classifier::builtin().unwrap()),
        BatchConfig::default(),
        RetentionPolicy {
            max_retained: 0,
            ..RetentionPolicy::default()
        },
    );
    assert!(matches!(result, Err(ManagerError::Batch(_))));
}

#[test]
fn out_of_range_ttl_is_rejected() {
    for finished_ttl_secs in [-1, i64::MAX] {
        let result = RunManager::new(
            make_store(1),
            Arc::new(Classifier::builtin().unwrap()),
            BatchConfig::default(),
            RetentionPolicy {
                max_retained: 4,
                finished_ttl_secs,
            },
        );
        assert!(
            matches!(result, Err(ManagerError::Batch(_))),
            "ttl {finished_ttl_secs} accepted"
        );
    }
}

#[tokio::test]
async fn every_waiter_sees_the_final_snapshot() {
    let manager = RunManager::new(
        make_store(2000),
        Arc::new(Classifier::builtin().unwrap()),
        BatchConfig::with_batch_size(10),
        RetentionPolicy::default(),
    )
    .unwrap();

    let id = manager.start().unwrap();
    let (first, second) = tokio::join!(manager.wait(&id), manager.wait(&id));

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!(first.status, RunStatus::Completed);
    assert_eq!(second.status, RunStatus::Completed);
    assert_eq!(second.processed_records, 2000);
    assert_eq!(first, second);
}

#[tokio::test]
async fn finished_runs_expire_after_ttl() {
    let manager = make_manager(
        make_store(5),
        RetentionPolicy {
            finished_ttl_secs: 60,
            ..RetentionPolicy::default()
        },
    );

    let id = manager.start().unwrap();
    manager.wait(&id).await.unwrap();

    let now = Utc::now();
    assert_eq!(manager.evict_finished(now), 0);
    assert_eq!(manager.evict_finished(now + Duration::seconds(61)), 1);
    assert!(matches!(manager.progress(&id), Err(ManagerError::UnknownRun(_))));
}

#[tokio::test]
async fn active_runs_are_never_evicted() {
    let manager = make_manager(
        make_store(5),
        RetentionPolicy {
            max_retained: 1,
            finished_ttl_secs: 0,
        },
    );

    let first = manager.start().unwrap();
    assert_eq!(manager.evict_finished(Utc::now() + Duration::days(1)), 0);
    assert!(matches!(
        manager.start(),
        Err(ManagerError::CapacityExhausted { max_retained: 1 })
    ));

    manager.wait(&first).await.unwrap();
    let second = manager.start().unwrap();
    assert_eq!(manager.run_ids(), vec![second]);
    manager.wait(&second).await.unwrap();
}

#[tokio::test]
async fn oldest_finished_run_makes_room() {
    let manager = make_manager(
        make_store(5),
        RetentionPolicy {
            max_retained: 2,
            finished_ttl_secs: 3600,
        },
    );

    let a = manager.start().unwrap();
    manager.wait(&a).await.unwrap();
    let b = manager.start().unwrap();
    manager.wait(&b).await.unwrap();
    let c = manager.start().unwrap();

    assert_eq!(manager.run_ids(), vec![b, c]);
    assert!(matches!(manager.progress(&a), Err(ManagerError::UnknownRun(_))));
    manager.wait(&c).await.unwrap();
}

#[tokio::test]
async fn replaced_rules_apply_to_later_runs() {
    let store = make_store(4);
    let manager = make_manager(store.clone(), RetentionPolicy::default());

    let first = manager.start().unwrap();
    let before = manager.wait(&first).await.unwrap();

    let main = builtin::main_group().unwrap();
    let personality = builtin::personality_group().unwrap();
    let personality_rules = builtin::personality_rules(&personality).unwrap();
    let bare = Classifier::new(
        GroupRules::new(main.clone(), KeywordRuleSet::empty(&main)).unwrap(),
        GroupRules::new(personality, personality_rules).unwrap(),
    );
    manager.replace_classifier(Arc::new(bare));

    let second = manager.start().unwrap();
    let after = manager.wait(&second).await.unwrap();

    let main_id = GroupId::from(builtin::MAIN_GROUP);
    assert_ne!(before.rules_fingerprints[&main_id], after.rules_fingerprints[&main_id]);
    let record = store.get(&RecordId::new("r0")).unwrap().unwrap();
    assert_eq!(record.main_category.unwrap().as_str(), builtin::DEFAULT);
}
