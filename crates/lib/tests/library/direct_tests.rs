use redseed_lib::desired::{Category, DesiredState};
use redseed_lib::reconcile::{ReconcileOptions, reconcile};
use redseed_lib::report::Outcome;
use redseed_lib::target::{DataStore, DirectAdapter, DryRunAdapter, TargetAdapter};
use serde_json::json;

use super::common::{FULL_SEED, StoreDir, fields, seed};

#[tokio::test]
async fn seeding_an_empty_store_creates_everything() {
  let store = StoreDir::new();
  let desired = seed(FULL_SEED);

  let mut adapter = DirectAdapter::open(store.path()).unwrap();
  let report = reconcile(&desired, &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();

  assert_eq!(report.counts().created, desired.len());
  assert!(!report.has_failures());

  let reopened = DataStore::open(store.path()).unwrap();
  assert_eq!(reopened.records(Category::Trackers).len(), 2);
  assert_eq!(reopened.records(Category::DocumentCategories).len(), 1);
}

#[tokio::test]
async fn second_run_changes_nothing() {
  let store = StoreDir::new();
  let desired = seed(FULL_SEED);

  let mut adapter = DirectAdapter::open(store.path()).unwrap();
  reconcile(&desired, &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();
  let before = std::fs::read_to_string(store.path()).unwrap();

  let mut adapter = DirectAdapter::open(store.path()).unwrap();
  let report = reconcile(&desired, &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();

  assert_eq!(report.counts().unchanged, desired.len());
  assert!(!report.has_changes());
  assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
}

#[tokio::test]
async fn changed_document_updates_only_what_differs() {
  let store = StoreDir::new();
  let mut adapter = DirectAdapter::open(store.path()).unwrap();
  reconcile(&seed(FULL_SEED), &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();

  let edited = FULL_SEED.replace("Something is broken", "Something is wrong");
  let report = reconcile(&seed(&edited), &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();

  assert_eq!(
    report.get(Category::Trackers, "Bug"),
    Some(&Outcome::Updated {
      changed: vec!["description".to_string()]
    })
  );
  assert_eq!(report.counts().updated, 1);

  let bug = adapter
    .list(Category::Trackers)
    .await
    .unwrap()
    .into_iter()
    .find(|r| r.name() == Some("Bug"))
    .unwrap();
  assert_eq!(bug.fields.get("description"), Some(&json!("Something is wrong")));
  assert_eq!(bug.fields.get("position"), Some(&json!(1)));
}

#[tokio::test]
async fn case_only_rename_converges() {
  let mut store = DataStore::in_memory();
  store.insert(
    Category::Trackers,
    fields(json!({"name": "Bug", "position": 1, "is_in_roadmap": false, "description": ""})),
  );
  let mut adapter = DirectAdapter::new(store);
  let desired = seed("trackers:\n  - { name: bug, position: 1, is_in_roadmap: false, description: \"\" }\n");

  let first = reconcile(&desired, &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();
  assert!(!first.has_failures());
  assert_eq!(first.counts().updated, 1);

  let second = reconcile(&desired, &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();
  assert_eq!(second.get(Category::Trackers, "bug"), Some(&Outcome::Unchanged));

  let trackers = adapter.list(Category::Trackers).await.unwrap();
  assert_eq!(trackers.len(), 1);
  assert_eq!(trackers[0].name(), Some("bug"));
}

#[tokio::test]
async fn partial_record_is_created_without_schema_check() {
  let mut desired = DesiredState::new();
  desired
    .insert(Category::Trackers, fields(json!({"name": "Feature", "position": 1})))
    .unwrap();
  let mut adapter = DirectAdapter::new(DataStore::in_memory());

  let report = reconcile(&desired, &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();

  assert_eq!(report.get(Category::Trackers, "Feature"), Some(&Outcome::Created));
  let trackers = adapter.list(Category::Trackers).await.unwrap();
  assert_eq!(trackers.len(), 1);
  assert_eq!(trackers[0].name(), Some("Feature"));
}

#[tokio::test]
async fn store_rejections_fail_single_records() {
  let mut desired = DesiredState::new();
  desired
    .insert(
      Category::IssuePriorities,
      fields(json!({"name": "An extremely long priority name that will not fit", "position": 1})),
    )
    .unwrap();
  desired
    .insert(Category::IssuePriorities, fields(json!({"name": "Urgent", "position": 2})))
    .unwrap();
  let mut adapter = DirectAdapter::new(DataStore::in_memory());

  let report = reconcile(&desired, &mut adapter, &ReconcileOptions::default())
    .await
    .unwrap();

  let counts = report.counts();
  assert_eq!(counts.failed, 1);
  assert_eq!(counts.created, 1);
  let failed = &report.entries()[0];
  assert!(failed.outcome.reason().unwrap().contains("Name is too long"));
}

#[tokio::test]
async fn plan_leaves_the_store_untouched() {
  let store = StoreDir::new();
  let desired = seed(FULL_SEED);

  let mut dry = DryRunAdapter::new(DirectAdapter::open(store.path()).unwrap());
  let report = reconcile(&desired, &mut dry, &ReconcileOptions::default())
    .await
    .unwrap();

  assert_eq!(report.counts().created, desired.len());
  assert_eq!(dry.planned().len(), desired.len());
  assert!(!store.path().exists());
}

#[test]
fn duplicate_names_fail_before_any_target_work() {
  let err = DesiredState::from_yaml_str(
    r#"
trackers:
  - { name: Bug, position: 1, is_in_roadmap: false, description: "" }
  - { name: Bug, position: 2, is_in_roadmap: false, description: "" }
"#,
  )
  .unwrap_err();

  assert_eq!(err.to_string(), "duplicate trackers name 'Bug'");
}
