//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the seed file, the data
/// store and the data home.
pub struct TestEnv {
  pub temp: TempDir,
  pub seed_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file.
  ///
  /// Copies the fixture content to a temporary `seed.yml` file.
  pub fn from_fixture(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let seed_path = temp.path().join("seed.yml");
    std::fs::write(&seed_path, fixture_content(name)).unwrap();
    Self { temp, seed_path }
  }

  /// Replace the seed file with another fixture.
  pub fn use_fixture(&self, name: &str) {
    std::fs::write(&self.seed_path, fixture_content(name)).unwrap();
  }

  /// Explicit data store path passed with `--store`.
  pub fn store_path(&self) -> PathBuf {
    self.temp.path().join("store").join("store.json")
  }

  /// Data home for the default store location.
  pub fn data_path(&self) -> PathBuf {
    self.temp.path().join("data")
  }

  /// Parsed contents of the data store.
  pub fn store_json(&self) -> Value {
    let content = std::fs::read_to_string(self.store_path()).unwrap();
    serde_json::from_str(&content).unwrap()
  }

  /// Get a pre-configured Command for the redseed binary.
  ///
  /// Clears everything that could reach outside the test:
  /// - `XDG_DATA_HOME`: isolated data path
  /// - `REDSEED_STORE`, `REDMICA_URL`, `REDMICA_ADMIN_API_KEY`: unset
  /// - `RUST_LOG`: unset
  pub fn redseed_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("redseed");
    cmd.env("XDG_DATA_HOME", self.data_path());
    cmd.env_remove("REDSEED_STORE");
    cmd.env_remove("REDMICA_URL");
    cmd.env_remove("REDMICA_ADMIN_API_KEY");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `redseed <command> seed.yml --target direct --store <store>`
  pub fn direct_cmd(&self, command: &str) -> Command {
    let mut cmd = self.redseed_cmd();
    cmd
      .arg(command)
      .arg(&self.seed_path)
      .arg("--target")
      .arg("direct")
      .arg("--store")
      .arg(self.store_path());
    cmd
  }
}
