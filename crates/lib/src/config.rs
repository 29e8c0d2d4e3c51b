//! Configuration errors and the remote target configuration.
//!
//! Everything here is resolved before any target is contacted: a document
//! that does not load, or a remote target without a token, stops the run
//! with a [`ConfigError`].

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::consts::{API_KEY_ENV, DEFAULT_URL, URL_ENV};
use crate::desired::{Category, SchemaViolation};

/// Default per-request timeout for the remote target.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status assigned to trackers created remotely when the document does not name one.
pub const DEFAULT_TRACKER_STATUS_ID: u64 = 1;

/// Errors raised while loading the desired state or the target configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse desired-state document: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("desired-state document must be a mapping of category to records")]
  NotAMapping,

  #[error("'{key}' must be a list of records")]
  NotASequence { key: String },

  #[error("{category} record #{index} must be a mapping of field to value")]
  RecordNotAMapping { category: Category, index: usize },

  #[error("duplicate {category} name '{name}'")]
  DuplicateName { category: Category, name: String },

  #[error("desired state has {} schema violation(s)", .0.len())]
  Schema(Vec<SchemaViolation>),

  #[error("environment variable {var} is not set")]
  MissingEnv { var: &'static str },

  #[error("invalid target url '{url}': {reason}")]
  InvalidUrl { url: String, reason: String },
}

/// Connection settings for the remote target.
#[derive(Clone)]
pub struct RemoteConfig {
  pub base_url: String,
  pub api_key: String,
  pub timeout: Duration,
  pub tracker_default_status_id: u64,
}

impl RemoteConfig {
  pub fn new(base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
    let parsed = reqwest::Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
      url: base_url.to_string(),
      reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(ConfigError::InvalidUrl {
        url: base_url.to_string(),
        reason: "scheme must be http or https".to_string(),
      });
    }
    if api_key.trim().is_empty() {
      return Err(ConfigError::MissingEnv { var: API_KEY_ENV });
    }

    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.to_string(),
      timeout: DEFAULT_TIMEOUT,
      tracker_default_status_id: DEFAULT_TRACKER_STATUS_ID,
    })
  }

  /// Read `REDMICA_URL` and `REDMICA_ADMIN_API_KEY`.
  ///
  /// The url falls back to `http://localhost:3000`; the key is mandatory.
  pub fn from_env() -> Result<Self, ConfigError> {
    let base_url = std::env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_URL.to_string());
    let api_key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingEnv { var: API_KEY_ENV })?;
    Self::new(&base_url, &api_key)
  }

  pub fn with_base_url(self, base_url: &str) -> Result<Self, ConfigError> {
    let api_key = self.api_key.clone();
    Ok(Self {
      timeout: self.timeout,
      tracker_default_status_id: self.tracker_default_status_id,
      ..Self::new(base_url, &api_key)?
    })
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_tracker_default_status(mut self, status_id: u64) -> Self {
    self.tracker_default_status_id = status_id;
    self
  }
}

impl fmt::Debug for RemoteConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RemoteConfig")
      .field("base_url", &self.base_url)
      .field("api_key", &"<redacted>")
      .field("timeout", &self.timeout)
      .field("tracker_default_status_id", &self.tracker_default_status_id)
      .finish()
  }
}
