//! Per-category field schemas and value coercion.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::category::Category;

/// Coarse type of a recognized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  String,
  Boolean,
  Integer,
}

impl FieldType {
  /// Strict check used by validation: the document must already carry the right type.
  pub fn matches(self, value: &Value) -> bool {
    match self {
      FieldType::String => value.is_string(),
      FieldType::Boolean => value.is_boolean(),
      FieldType::Integer => value.is_i64() || value.is_u64(),
    }
  }

  /// Lenient conversion used when comparing against what the target reports.
  ///
  /// Returns `None` for null or for values that cannot represent this type.
  pub fn coerce(self, value: &Value) -> Option<FieldValue> {
    match self {
      FieldType::String => match value {
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => Some(FieldValue::Text(n.to_string())),
        Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
        _ => None,
      },
      FieldType::Boolean => match value {
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
          Some(0) => Some(FieldValue::Bool(false)),
          Some(1) => Some(FieldValue::Bool(true)),
          _ => None,
        },
        Value::String(s) => match s.trim() {
          "true" | "1" => Some(FieldValue::Bool(true)),
          "false" | "0" => Some(FieldValue::Bool(false)),
          _ => None,
        },
        _ => None,
      },
      FieldType::Integer => match value {
        Value::Number(n) => n
          .as_i64()
          .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
          .map(FieldValue::Integer),
        Value::String(s) => s.trim().parse().ok().map(FieldValue::Integer),
        _ => None,
      },
    }
  }
}

impl fmt::Display for FieldType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldType::String => f.write_str("string"),
      FieldType::Boolean => f.write_str("boolean"),
      FieldType::Integer => f.write_str("integer"),
    }
  }
}

/// A field value after coercion to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
  Text(String),
  Bool(bool),
  Integer(i64),
}

/// A recognized field of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub name: &'static str,
  pub ty: FieldType,
  pub required: bool,
}

const fn required(name: &'static str, ty: FieldType) -> FieldSpec {
  FieldSpec { name, ty, required: true }
}

const fn optional(name: &'static str, ty: FieldType) -> FieldSpec {
  FieldSpec {
    name,
    ty,
    required: false,
  }
}

/// What happens to fields a category does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
  /// Reported as a schema violation.
  Reject,
  /// Dropped before comparison and writes.
  Ignore,
}

/// The fixed schema of a category.
#[derive(Debug, Clone, Copy)]
pub struct CategorySchema {
  pub fields: &'static [FieldSpec],
  pub unknown_fields: UnknownFieldPolicy,
}

impl CategorySchema {
  pub fn field(&self, name: &str) -> Option<&FieldSpec> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn recognizes(&self, name: &str) -> bool {
    self.field(name).is_some()
  }
}

const TRACKERS: CategorySchema = CategorySchema {
  fields: &[
    required("name", FieldType::String),
    required("position", FieldType::Integer),
    required("is_in_roadmap", FieldType::Boolean),
    required("description", FieldType::String),
  ],
  unknown_fields: UnknownFieldPolicy::Reject,
};

const ISSUE_STATUSES: CategorySchema = CategorySchema {
  fields: &[
    required("name", FieldType::String),
    required("position", FieldType::Integer),
    required("is_closed", FieldType::Boolean),
    required("is_default", FieldType::Boolean),
  ],
  unknown_fields: UnknownFieldPolicy::Reject,
};

const ISSUE_PRIORITIES: CategorySchema = CategorySchema {
  fields: &[
    required("name", FieldType::String),
    required("position", FieldType::Integer),
    required("is_default", FieldType::Boolean),
    required("active", FieldType::Boolean),
  ],
  unknown_fields: UnknownFieldPolicy::Reject,
};

const TIME_ENTRY_ACTIVITIES: CategorySchema = CategorySchema {
  fields: &[
    required("name", FieldType::String),
    required("position", FieldType::Integer),
    required("is_default", FieldType::Boolean),
    optional("active", FieldType::Boolean),
  ],
  unknown_fields: UnknownFieldPolicy::Ignore,
};

const DOCUMENT_CATEGORIES: CategorySchema = CategorySchema {
  fields: &[
    required("name", FieldType::String),
    required("position", FieldType::Integer),
    optional("is_default", FieldType::Boolean),
    optional("active", FieldType::Boolean),
  ],
  unknown_fields: UnknownFieldPolicy::Ignore,
};

impl Category {
  pub fn schema(self) -> &'static CategorySchema {
    match self {
      Category::Trackers => &TRACKERS,
      Category::IssueStatuses => &ISSUE_STATUSES,
      Category::IssuePriorities => &ISSUE_PRIORITIES,
      Category::TimeEntryActivities => &TIME_ENTRY_ACTIVITIES,
      Category::DocumentCategories => &DOCUMENT_CATEGORIES,
    }
  }
}
