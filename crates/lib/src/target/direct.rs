//! Direct adapter: in-process mutation of a [`DataStore`].

use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use super::TargetAdapter;
use super::store::{DataStore, StoreError};
use super::types::{ActualRecord, AdapterError, RecordId};
use crate::desired::{Category, FieldType, Fields, name_key};

/// Longest name the store accepts.
const NAME_MAX_LENGTH: usize = 30;

/// Target adapter over a local data store.
///
/// Every category can be listed and written. Records are checked the way the
/// target's own models check them before anything is saved; each successful
/// mutation is persisted immediately.
#[derive(Debug)]
pub struct DirectAdapter {
  store: DataStore,
}

impl DirectAdapter {
  pub fn new(store: DataStore) -> Self {
    Self { store }
  }

  pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
    Ok(Self::new(DataStore::open(path)?))
  }

  fn persist(&mut self, before: DataStore) -> Result<(), AdapterError> {
    if let Err(e) = self.store.save() {
      self.store = before;
      return Err(AdapterError::connection(e.to_string()));
    }
    Ok(())
  }
}

impl TargetAdapter for DirectAdapter {
  fn describe(&self) -> String {
    match self.store.path() {
      Some(path) => format!("data store {}", path.display()),
      None => "in-memory data store".to_string(),
    }
  }

  async fn list(&self, category: Category) -> Result<Vec<ActualRecord>, AdapterError> {
    Ok(self.store.records(category).to_vec())
  }

  async fn create(&mut self, category: Category, fields: &Fields) -> Result<ActualRecord, AdapterError> {
    let errors = check_record(&self.store, category, fields, None);
    if !errors.is_empty() {
      return Err(AdapterError::validation(errors));
    }

    let before = self.store.clone();
    let record = self.store.insert(category, fields.clone());
    self.persist(before)?;

    debug!(%category, id = %record.id, "inserted record");
    Ok(record)
  }

  async fn update(&mut self, category: Category, id: RecordId, fields: &Fields) -> Result<ActualRecord, AdapterError> {
    if self.store.get(category, id).is_none() {
      return Err(AdapterError::NotFound { category, id });
    }

    let errors = check_record(&self.store, category, fields, Some(id));
    if !errors.is_empty() {
      return Err(AdapterError::validation(errors));
    }

    let before = self.store.clone();
    let record = self
      .store
      .replace(category, id, fields.clone())
      .ok_or(AdapterError::NotFound { category, id })?;
    self.persist(before)?;

    debug!(%category, %id, "replaced record");
    Ok(record)
  }
}

/// Model-level checks, collected into full messages.
fn check_record(store: &DataStore, category: Category, fields: &Fields, own_id: Option<RecordId>) -> Vec<String> {
  let mut errors = Vec::new();

  match fields.get("name").and_then(Value::as_str).map(str::trim) {
    None | Some("") => errors.push("Name cannot be blank".to_string()),
    Some(name) => {
      if name.chars().count() > NAME_MAX_LENGTH {
        errors.push(format!("Name is too long (maximum is {} characters)", NAME_MAX_LENGTH));
      }
      let key = name_key(name);
      let taken = store
        .records(category)
        .iter()
        .any(|r| Some(r.id) != own_id && r.name().is_some_and(|other| name_key(other) == key));
      if taken {
        errors.push("Name has already been taken".to_string());
      }
    }
  }

  for spec in category.schema().fields {
    let Some(value) = fields.get(spec.name).filter(|v| !v.is_null()) else {
      continue;
    };
    if spec.ty.coerce(value).is_some() {
      continue;
    }
    match spec.ty {
      FieldType::Integer => errors.push(format!("{} is not a number", humanize(spec.name))),
      FieldType::Boolean => errors.push(format!("{} is not included in the list", humanize(spec.name))),
      FieldType::String => errors.push(format!("{} is invalid", humanize(spec.name))),
    }
  }

  errors
}

/// `is_in_roadmap` -> `Is in roadmap`
fn humanize(field: &str) -> String {
  let spaced = field.replace('_', " ");
  let mut chars = spaced.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
