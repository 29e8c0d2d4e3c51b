//! Records and errors shared by every target adapter.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::desired::{Category, Fields};

/// Identifier the target system assigned to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// An entity as the target system currently holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualRecord {
  pub id: RecordId,
  pub fields: Fields,
}

impl ActualRecord {
  pub fn new(id: RecordId, fields: Fields) -> Self {
    Self { id, fields }
  }

  pub fn name(&self) -> Option<&str> {
    self.fields.get("name").and_then(Value::as_str)
  }
}

/// The capability an adapter was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  List,
  Create,
  Update,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operation::List => f.write_str("listing"),
      Operation::Create => f.write_str("creating"),
      Operation::Update => f.write_str("updating"),
    }
  }
}

/// How far an adapter error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
  /// Stops the whole run.
  Run,
  /// Stops the remaining work of the current category.
  Category,
  /// Affects a single record.
  Record,
}

/// Errors reported by a target adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
  /// The target could not be reached, or a request timed out.
  #[error("connection to target failed: {message}")]
  Connection { message: String },

  /// Credentials were missing or rejected.
  #[error("authentication rejected by target: {message}")]
  Auth { message: String },

  /// The adapter cannot perform this operation on the category.
  #[error("{operation} {category} is not supported by this adapter")]
  NotSupported { category: Category, operation: Operation },

  /// The target rejected the record, with its field-level messages.
  #[error("rejected by target: {}", .messages.join(", "))]
  Validation { messages: Vec<String> },

  /// The record to update no longer exists.
  #[error("{category} #{id} no longer exists")]
  NotFound { category: Category, id: RecordId },

  /// Any other non-success HTTP status.
  #[error("unexpected HTTP status {status}: {body}")]
  UnexpectedStatus { status: u16, body: String },

  /// The target answered with something that could not be understood.
  #[error("invalid response from target: {message}")]
  Decode { message: String },
}

impl AdapterError {
  pub fn scope(&self) -> ErrorScope {
    match self {
      AdapterError::Auth { .. } => ErrorScope::Run,
      AdapterError::Connection { .. } => ErrorScope::Category,
      AdapterError::NotSupported { .. }
      | AdapterError::Validation { .. }
      | AdapterError::NotFound { .. }
      | AdapterError::UnexpectedStatus { .. }
      | AdapterError::Decode { .. } => ErrorScope::Record,
    }
  }

  pub fn connection(message: impl Into<String>) -> Self {
    AdapterError::Connection {
      message: message.into(),
    }
  }

  pub fn validation(messages: Vec<String>) -> Self {
    AdapterError::Validation { messages }
  }
}
