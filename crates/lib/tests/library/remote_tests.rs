use mockito::{Matcher, Server};
use redseed_lib::config::RemoteConfig;
use redseed_lib::desired::Category;
use redseed_lib::reconcile::{ReconcileError, ReconcileOptions, UNSUPPORTED_CATEGORY, reconcile};
use redseed_lib::report::Outcome;
use redseed_lib::target::{DryRunAdapter, RemoteAdapter};

use super::common::seed;

const REMOTE_SEED: &str = r#"
trackers:
  - { name: Bug, position: 1, is_in_roadmap: false, description: Something is broken }
  - { name: Feature, position: 2, is_in_roadmap: true, description: New functionality }
issue_statuses:
  - { name: New, position: 1, is_closed: false, is_default: true }
  - { name: Closed, position: 2, is_closed: true, is_default: false }
document_categories:
  - { name: Documentation, position: 1 }
"#;

fn adapter(url: &str) -> RemoteAdapter {
  RemoteAdapter::new(RemoteConfig::new(url, "admin-key").unwrap()).unwrap()
}

#[tokio::test]
async fn reconciles_what_the_api_allows() {
  let mut server = Server::new_async().await;
  let _trackers = server
    .mock("GET", "/trackers.json")
    .match_header("x-redmine-api-key", "admin-key")
    .with_status(200)
    .with_body(r#"{"trackers":[{"id":1,"name":"Bug","description":"Something is broken","default_status":{"id":1,"name":"New"}}]}"#)
    .create_async()
    .await;
  let create = server
    .mock("POST", "/trackers.json")
    .match_body(Matcher::PartialJsonString(r#"{"tracker":{"name":"Feature"}}"#.to_string()))
    .with_status(201)
    .with_body(r#"{"tracker":{"id":2,"name":"Feature","description":"New functionality"}}"#)
    .expect(1)
    .create_async()
    .await;
  let _statuses = server
    .mock("GET", "/issue_statuses.json")
    .with_status(200)
    .with_body(r#"{"issue_statuses":[{"id":1,"name":"New","is_closed":false}]}"#)
    .create_async()
    .await;

  let mut remote = adapter(&server.url());
  let report = reconcile(&seed(REMOTE_SEED), &mut remote, &ReconcileOptions::default())
    .await
    .unwrap();
  create.assert_async().await;

  assert_eq!(report.get(Category::Trackers, "Bug"), Some(&Outcome::Unchanged));
  assert_eq!(report.get(Category::Trackers, "Feature"), Some(&Outcome::Created));
  assert_eq!(report.get(Category::IssueStatuses, "New"), Some(&Outcome::Unchanged));
  assert!(matches!(
    report.get(Category::IssueStatuses, "Closed"),
    Some(Outcome::Skipped { .. })
  ));
  assert_eq!(
    report.get(Category::DocumentCategories, "Documentation"),
    Some(&Outcome::skipped(UNSUPPORTED_CATEGORY))
  );
  assert!(!report.has_failures());
}

#[tokio::test]
async fn rejected_credentials_abort_before_any_write() {
  let mut server = Server::new_async().await;
  let _trackers = server.mock("GET", "/trackers.json").with_status(401).create_async().await;
  let writes = server.mock("POST", Matcher::Any).expect(0).create_async().await;
  let statuses = server
    .mock("GET", "/issue_statuses.json")
    .expect(0)
    .create_async()
    .await;

  let mut remote = adapter(&server.url());
  let err = reconcile(&seed(REMOTE_SEED), &mut remote, &ReconcileOptions::default())
    .await
    .unwrap_err();

  assert!(matches!(err, ReconcileError::Auth { .. }));
  assert!(err.report().is_empty());
  writes.assert_async().await;
  statuses.assert_async().await;
}

#[tokio::test]
async fn plan_against_the_api_sends_no_writes() {
  let mut server = Server::new_async().await;
  let _trackers = server
    .mock("GET", "/trackers.json")
    .with_status(200)
    .with_body(r#"{"trackers":[{"id":1,"name":"Bug","description":"Old text"}]}"#)
    .create_async()
    .await;
  let _statuses = server
    .mock("GET", "/issue_statuses.json")
    .with_status(200)
    .with_body(r#"{"issue_statuses":[]}"#)
    .create_async()
    .await;
  let writes = server.mock("POST", Matcher::Any).expect(0).create_async().await;
  let updates = server.mock("PUT", Matcher::Any).expect(0).create_async().await;

  let mut dry = DryRunAdapter::new(adapter(&server.url()));
  let report = reconcile(&seed(REMOTE_SEED), &mut dry, &ReconcileOptions::default())
    .await
    .unwrap();

  assert_eq!(
    report.get(Category::Trackers, "Bug"),
    Some(&Outcome::Updated {
      changed: vec!["description".to_string()]
    })
  );
  assert_eq!(report.get(Category::Trackers, "Feature"), Some(&Outcome::Created));
  assert!(matches!(
    report.get(Category::IssueStatuses, "New"),
    Some(Outcome::Skipped { .. })
  ));
  assert_eq!(dry.planned().len(), 2);
  writes.assert_async().await;
  updates.assert_async().await;
}
