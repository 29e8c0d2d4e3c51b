use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

#[test]
fn plan_writes_nothing() {
  let env = TestEnv::from_fixture("seed.yml");

  env
    .direct_cmd("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("+ Bug (would create)"))
    .stdout(predicate::str::contains("To create: 8"))
    .stdout(predicate::str::contains("Dry run - no changes made"));

  assert!(!env.store_path().exists());
}

#[test]
fn plan_after_apply_shows_pending_updates() {
  let env = TestEnv::from_fixture("seed.yml");
  env.direct_cmd("apply").assert().success();
  let before = std::fs::read_to_string(env.store_path()).unwrap();

  env.use_fixture("seed_changed.yml");
  env
    .direct_cmd("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("~ Bug (would update: description)"))
    .stdout(predicate::str::contains("To update: 2"))
    .stdout(predicate::str::contains("Unchanged: 6"));

  assert_eq!(std::fs::read_to_string(env.store_path()).unwrap(), before);
}

#[test]
fn plan_json_marks_dry_run() {
  let env = TestEnv::from_fixture("seed.yml");

  let output = env.direct_cmd("plan").arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["dry_run"], true);
  assert_eq!(json["counts"]["created"], 8);
}
