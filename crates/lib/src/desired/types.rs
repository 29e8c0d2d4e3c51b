//! Desired records, the desired-state tree, and schema violations.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::category::Category;
use super::schema::{FieldType, UnknownFieldPolicy};
use crate::config::ConfigError;

/// Field name -> value, shared by desired and actual records.
pub type Fields = serde_json::Map<String, Value>;

/// Key two names share when the target would consider them the same record.
///
/// Surrounding whitespace and letter case are ignored.
pub fn name_key(name: &str) -> String {
  name.trim().to_lowercase()
}

/// One entity the desired state wants present.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredRecord {
  index: usize,
  fields: Fields,
}

impl DesiredRecord {
  /// Position of the record within its category in the input.
  pub fn index(&self) -> usize {
    self.index
  }

  /// The natural key, if the document supplied a string name.
  pub fn name(&self) -> Option<&str> {
    self.fields.get("name").and_then(Value::as_str)
  }

  /// Every field as written in the document.
  pub fn fields(&self) -> &Fields {
    &self.fields
  }

  /// Name for messages, falling back to the input position.
  pub fn display_name(&self) -> String {
    match self.name() {
      Some(name) => name.to_string(),
      None => format!("#{}", self.index),
    }
  }

  /// Fields the category schema recognizes, with nulls treated as absent.
  ///
  /// This is the set the reconciler compares and writes.
  pub fn recognized_fields(&self, category: Category) -> Fields {
    let schema = category.schema();
    self
      .fields
      .iter()
      .filter(|(name, value)| schema.recognizes(name) && !value.is_null())
      .map(|(name, value)| (name.clone(), value.clone()))
      .collect()
  }
}

/// What is wrong with a desired record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
  MissingName,
  MissingField { field: String },
  WrongType { field: String, expected: FieldType },
  UnknownField { field: String },
}

impl fmt::Display for ViolationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ViolationKind::MissingName => write!(f, "missing name"),
      ViolationKind::MissingField { field } => write!(f, "missing required field '{}'", field),
      ViolationKind::WrongType { field, expected } => write!(f, "field '{}' must be a {}", field, expected),
      ViolationKind::UnknownField { field } => write!(f, "unrecognized field '{}'", field),
    }
  }
}

/// A schema problem found by [`DesiredState::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
  pub category: Category,
  pub index: usize,
  pub record: String,
  #[serde(flatten)]
  pub kind: ViolationKind,
}

impl fmt::Display for SchemaViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}[{}] '{}': {}", self.category, self.index, self.record, self.kind)
  }
}

/// The desired state: categories mapped to their records in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
  categories: BTreeMap<Category, Vec<DesiredRecord>>,
}

impl DesiredState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a record to a category.
  ///
  /// Names must be unique within a category, compared by [`name_key`]; a
  /// repeat is a load-time error.
  pub fn insert(&mut self, category: Category, fields: Fields) -> Result<(), ConfigError> {
    let records = self.categories.entry(category).or_default();
    let record = DesiredRecord {
      index: records.len(),
      fields,
    };

    if let Some(name) = record.name() {
      let key = name_key(name);
      if records.iter().any(|r| r.name().is_some_and(|other| name_key(other) == key)) {
        return Err(ConfigError::DuplicateName {
          category,
          name: name.to_string(),
        });
      }
    }

    records.push(record);
    Ok(())
  }

  /// Mark a category as present even when it lists no records.
  pub fn declare(&mut self, category: Category) {
    self.categories.entry(category).or_default();
  }

  /// Present categories with their records, in processing order.
  pub fn categories(&self) -> impl Iterator<Item = (Category, &[DesiredRecord])> {
    self.categories.iter().map(|(c, records)| (*c, records.as_slice()))
  }

  pub fn records(&self, category: Category) -> &[DesiredRecord] {
    self.categories.get(&category).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn contains(&self, category: Category) -> bool {
    self.categories.contains_key(&category)
  }

  /// Total number of records across categories.
  pub fn len(&self) -> usize {
    self.categories.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Check every record against its category schema.
  ///
  /// All violations are collected so a single report lists every problem.
  pub fn validate(&self) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    for (category, records) in self.categories() {
      let schema = category.schema();

      for record in records {
        let mut push = |kind| {
          violations.push(SchemaViolation {
            category,
            index: record.index(),
            record: record.display_name(),
            kind,
          })
        };

        if record.name().is_none() {
          push(ViolationKind::MissingName);
        }

        for spec in schema.fields {
          match record.fields().get(spec.name) {
            None | Some(Value::Null) => {
              if spec.required && spec.name != "name" {
                push(ViolationKind::MissingField {
                  field: spec.name.to_string(),
                });
              }
            }
            Some(value) => {
              if !spec.ty.matches(value) && spec.name != "name" {
                push(ViolationKind::WrongType {
                  field: spec.name.to_string(),
                  expected: spec.ty,
                });
              }
            }
          }
        }

        if schema.unknown_fields == UnknownFieldPolicy::Reject {
          for field in record.fields().keys().filter(|f| !schema.recognizes(f)) {
            push(ViolationKind::UnknownField { field: field.clone() });
          }
        }
      }
    }

    violations
  }
}
