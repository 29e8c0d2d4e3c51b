use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

fn tracker_names(store: &Value) -> Vec<String> {
  store["categories"]["trackers"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["fields"]["name"].as_str().unwrap().to_string())
    .collect()
}

#[test]
fn apply_direct_creates_every_record() {
  let env = TestEnv::from_fixture("seed.yml");

  env
    .direct_cmd("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Apply complete!"))
    .stdout(predicate::str::contains("+ Bug (created)"))
    .stdout(predicate::str::contains("Created: 8"));

  let store = env.store_json();
  assert_eq!(tracker_names(&store), vec!["Bug", "Feature"]);
  assert_eq!(store["categories"]["document_categories"].as_array().unwrap().len(), 1);
}

#[test]
fn apply_twice_changes_nothing() {
  let env = TestEnv::from_fixture("seed.yml");
  env.direct_cmd("apply").assert().success();
  let before = std::fs::read_to_string(env.store_path()).unwrap();

  env
    .direct_cmd("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Created: 0"))
    .stdout(predicate::str::contains("Unchanged: 8"));

  assert_eq!(std::fs::read_to_string(env.store_path()).unwrap(), before);
}

#[test]
fn apply_updates_changed_fields_only() {
  let env = TestEnv::from_fixture("seed.yml");
  env.direct_cmd("apply").assert().success();

  env.use_fixture("seed_changed.yml");
  env
    .direct_cmd("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("~ Bug (updated: description)"))
    .stdout(predicate::str::contains("~ Urgent (updated: position)"))
    .stdout(predicate::str::contains("Updated: 2"));

  let store = env.store_json();
  let bug = &store["categories"]["trackers"][0];
  assert_eq!(bug["id"], 1);
  assert_eq!(bug["fields"]["description"], "Something does not work");
}

#[test]
fn apply_json_output() {
  let env = TestEnv::from_fixture("seed.yml");

  let output = env.direct_cmd("apply").arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["succeeded"], true);
  assert_eq!(json["dry_run"], false);
  assert_eq!(json["counts"]["created"], 8);
  assert_eq!(json["entries"][0]["category"], "trackers");
  assert_eq!(json["entries"][0]["name"], "Bug");
  assert_eq!(json["entries"][0]["outcome"], "created");
}

#[test]
fn apply_uses_default_store_under_data_home() {
  let env = TestEnv::from_fixture("seed.yml");

  env
    .redseed_cmd()
    .arg("apply")
    .arg(&env.seed_path)
    .arg("--target")
    .arg("direct")
    .assert()
    .success();

  assert!(env.data_path().join("redseed").join("store.json").exists());
}

#[test]
fn rejected_record_fails_run_but_others_are_created() {
  let env = TestEnv::from_fixture("rejected.yml");

  env
    .direct_cmd("apply")
    .assert()
    .failure()
    .stdout(predicate::str::contains("Name is too long (maximum is 30 characters)"))
    .stdout(predicate::str::contains("+ Low (created)"))
    .stderr(predicate::str::contains("Completed with failures"));
}

#[test]
fn remote_requires_api_key() {
  let env = TestEnv::from_fixture("seed.yml");

  env
    .redseed_cmd()
    .arg("apply")
    .arg(&env.seed_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("REDMICA_ADMIN_API_KEY"));
}

#[test]
fn unreachable_remote_fails_each_category() {
  let env = TestEnv::from_fixture("seed.yml");

  env
    .redseed_cmd()
    .env("REDMICA_ADMIN_API_KEY", "secret")
    .arg("apply")
    .arg(&env.seed_path)
    .arg("--url")
    .arg("http://127.0.0.1:1")
    .arg("--timeout")
    .arg("2s")
    .assert()
    .failure()
    .stdout(predicate::str::contains("could not list trackers"))
    .stdout(predicate::str::contains("category not supported by this adapter"));
}

#[test]
fn invalid_timeout_is_rejected() {
  let env = TestEnv::from_fixture("seed.yml");

  env
    .direct_cmd("apply")
    .arg("--timeout")
    .arg("soon")
    .assert()
    .failure()
    .stderr(predicate::str::contains("--timeout"));
}
