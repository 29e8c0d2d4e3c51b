//! Local data store behind the direct adapter.
//!
//! # Storage Layout
//!
//! A single JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "next_id": 4,
//!   "categories": {
//!     "trackers": [ { "id": 1, "fields": { "name": "Bug", ... } } ],
//!     ...
//!   }
//! }
//! ```
//!
//! Ids are handed out from `next_id` and never reused.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::types::{ActualRecord, RecordId};
use crate::desired::{Category, Fields};

/// Current on-disk format version.
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to create store directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to read store: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write store: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse store: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize store: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported store version: {0}")]
  UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoreData {
  version: u32,
  next_id: u64,
  #[serde(default)]
  categories: BTreeMap<Category, Vec<ActualRecord>>,
}

impl Default for StoreData {
  fn default() -> Self {
    Self {
      version: STORE_VERSION,
      next_id: 1,
      categories: BTreeMap::new(),
    }
  }
}

/// Records of every category, optionally backed by a file.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
  /// `None` keeps everything in memory.
  path: Option<PathBuf>,
  data: StoreData,
}

impl DataStore {
  /// An empty store that is never written to disk.
  pub fn in_memory() -> Self {
    Self::default()
  }

  /// Open the store at `path`.
  ///
  /// A missing file is an empty store; it is created on the first save.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
    let path = path.into();

    let data = match fs::read_to_string(&path) {
      Ok(content) => {
        let data: StoreData = serde_json::from_str(&content).map_err(StoreError::Parse)?;
        if data.version != STORE_VERSION {
          return Err(StoreError::UnsupportedVersion(data.version));
        }
        data
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => StoreData::default(),
      Err(e) => return Err(StoreError::Read(e)),
    };

    debug!(path = %path.display(), "opened data store");
    Ok(Self { path: Some(path), data })
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn records(&self, category: Category) -> &[ActualRecord] {
    self
      .data
      .categories
      .get(&category)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  pub fn get(&self, category: Category, id: RecordId) -> Option<&ActualRecord> {
    self.records(category).iter().find(|r| r.id == id)
  }

  /// Add a record under a fresh id. Call [`save`](Self::save) to persist.
  pub fn insert(&mut self, category: Category, fields: Fields) -> ActualRecord {
    let id = RecordId(self.data.next_id);
    self.data.next_id += 1;

    let record = ActualRecord::new(id, fields);
    self.data.categories.entry(category).or_default().push(record.clone());
    record
  }

  /// Replace the fields of an existing record. Returns `None` if `id` is unknown.
  pub fn replace(&mut self, category: Category, id: RecordId, fields: Fields) -> Option<ActualRecord> {
    let record = self
      .data
      .categories
      .get_mut(&category)?
      .iter_mut()
      .find(|r| r.id == id)?;
    record.fields = fields;
    Some(record.clone())
  }

  /// Write the store to disk.
  ///
  /// Uses atomic write (write to temp, then rename) to prevent corruption.
  /// In-memory stores have nothing to do.
  pub fn save(&self) -> Result<(), StoreError> {
    let Some(path) = &self.path else {
      return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(&self.data).map_err(StoreError::Serialize)?;
    fs::write(&temp_path, &content).map_err(StoreError::Write)?;
    fs::rename(&temp_path, path).map_err(StoreError::Write)?;

    Ok(())
  }
}
