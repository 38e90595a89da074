use bucket_core::record::{
    normalize_tags, split_tag_list, Assignment, InMemoryRecordStore, Record, RecordId, RecordStore,
    StoreError,
};
use bucket_core::types::{CategoryCode, GroupId};

fn make_record(id: &str, tags: &[&str]) -> Record {
    Record::new(RecordId::new(id), tags.iter().map(|t| t.to_string()).collect())
}

#[test]
fn normalize_trims_drops_blank_and_dedupes_in_order() {
    let raw: Vec<String> = [" keto ", "", "   ", "yoga", "keto", "Keto"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(normalize_tags(&raw), vec!["keto", "yoga", "Keto"]);
}

#[test]
fn split_tag_list_handles_padding_and_trailing_commas() {
    assert_eq!(
        split_tag_list("keto, Health Summit,,  bunker ,"),
        vec!["keto", "Health Summit", "bunker"]
    );
    assert!(split_tag_list("").is_empty());
}

#[tokio::test]
async fn pages_follow_creation_order() {
    let store = InMemoryRecordStore::with_records(
        (0..5).map(|i| make_record(&format!("r{i}"), &[])).collect(),
    )
    .unwrap();

    assert_eq!(store.count().await.unwrap(), 5);
    let ids: Vec<String> = store
        .fetch_page(2, 2)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(ids, vec!["r2", "r3"]);
    assert!(store.fetch_page(5, 10).await.unwrap().is_empty());
}

#[test]
fn duplicate_ids_conflict() {
    let store = InMemoryRecordStore::new();
    store.insert(make_record("r1", &[])).unwrap();
    let err = store.insert(make_record("r1", &["x"])).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn commit_persists_only_category_fields() {
    let store = InMemoryRecordStore::with_records(vec![make_record("r1", &["keto"])]).unwrap();

    let mut page = store.fetch_page(0, 1).await.unwrap();
    page[0].tags.push("tampered".to_string());
    page[0].apply(Assignment {
        main: CategoryCode::from("HEALTH"),
        personality: CategoryCode::from("FITNESS_NUTRITION"),
    });
    store.commit(&page).await.unwrap();

    let stored = store.get(&RecordId::new("r1")).unwrap().unwrap();
    assert_eq!(stored.tags, vec!["keto".to_string()]);
    assert_eq!(stored.main_category, Some(CategoryCode::from("HEALTH")));
    assert!(stored.is_assigned());
}

#[tokio::test]
async fn commit_is_all_or_nothing() {
    let store = InMemoryRecordStore::with_records(vec![make_record("r1", &[])]).unwrap();

    let mut known = make_record("r1", &[]);
    known.main_category = Some(CategoryCode::from("A"));
    let mut unknown = make_record("ghost", &[]);
    unknown.main_category = Some(CategoryCode::from("A"));

    let err = store.commit(&[known, unknown]).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(store.get(&RecordId::new("r1")).unwrap().unwrap().main_category, None);
}

#[tokio::test]
async fn summary_counts_persisted_assignments() {
    let store = InMemoryRecordStore::with_records(vec![
        make_record("r1", &[]),
        make_record("r2", &[]),
        make_record("r3", &[]),
    ])
    .unwrap();
    let mut page = store.fetch_page(0, 2).await.unwrap();
    for record in &mut page {
        record.apply(Assignment {
            main: CategoryCode::from("HEALTH"),
            personality: CategoryCode::from("DEFAULT"),
        });
    }
    store.commit(&page).await.unwrap();

    let main = GroupId::from("main");
    let personality = GroupId::from("personality");
    let summary = store.summary(&main, &personality).unwrap();
    assert_eq!(summary.count(&main, &CategoryCode::from("HEALTH")), 2);
    assert_eq!(summary.total(&personality), 2);
}
