//! Loading the desired state from a YAML document.
//!
//! The document maps category keys to lists of field mappings:
//!
//! ```yaml
//! trackers:
//!   - name: Bug
//!     position: 1
//!     is_in_roadmap: false
//!     description: Something is broken
//! issue_statuses:
//!   - { name: New, position: 1, is_closed: false, is_default: true }
//! ```
//!
//! Keys that do not name a category are ignored with a warning so the same
//! seed file can carry sections meant for other tools.

use std::fs;
use std::path::Path;

use serde_yaml::Value as YamlValue;
use tracing::{debug, info, warn};

use super::category::Category;
use super::types::{DesiredState, Fields};
use crate::config::ConfigError;

impl DesiredState {
  /// Read, parse and validate a desired-state file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let state = Self::from_yaml_str(&content)?;
    info!(path = %path.display(), records = state.len(), "loaded desired state");
    Ok(state)
  }

  /// Parse and validate a desired-state document.
  ///
  /// Fails on malformed structure, duplicate names within a category, or any
  /// schema violation. Nothing outside this process is touched.
  pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
    let state = Self::parse_yaml_str(content)?;

    let violations = state.validate();
    if !violations.is_empty() {
      for violation in &violations {
        debug!(%violation, "schema violation");
      }
      return Err(ConfigError::Schema(violations));
    }

    Ok(state)
  }

  /// Parse a document without schema validation.
  ///
  /// Structural problems and duplicate names are still errors.
  pub fn parse_yaml_str(content: &str) -> Result<Self, ConfigError> {
    let root: YamlValue = serde_yaml::from_str(content)?;
    let mut state = DesiredState::new();

    let mapping = match root {
      YamlValue::Null => return Ok(state),
      YamlValue::Mapping(mapping) => mapping,
      _ => return Err(ConfigError::NotAMapping),
    };

    for (key, value) in mapping {
      let Some(key) = key.as_str() else {
        return Err(ConfigError::NotAMapping);
      };

      let Some(category) = Category::from_key(key) else {
        warn!(key, "ignoring unknown top-level key");
        continue;
      };

      let items = match value {
        YamlValue::Null => Vec::new(),
        YamlValue::Sequence(items) => items,
        _ => return Err(ConfigError::NotASequence { key: key.to_string() }),
      };

      state.declare(category);
      for item in items {
        let index = state.records(category).len();
        let fields = to_fields(item).ok_or(ConfigError::RecordNotAMapping { category, index })?;
        state.insert(category, fields)?;
      }
    }

    Ok(state)
  }
}

fn to_fields(item: YamlValue) -> Option<Fields> {
  if !item.is_mapping() {
    return None;
  }
  match serde_yaml::from_value::<serde_json::Value>(item) {
    Ok(serde_json::Value::Object(fields)) => Some(fields),
    _ => None,
  }
}
