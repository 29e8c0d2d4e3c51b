//! The desired-state model.
//!
//! A [`DesiredState`] maps each [`Category`] to its ordered [`DesiredRecord`]s.
//! Records are checked against the category's fixed [`CategorySchema`] by
//! [`DesiredState::validate`]; loading a document runs that check and turns
//! any violation into a [`ConfigError`](crate::config::ConfigError).

mod category;
mod load;
mod schema;
mod types;

pub use category::Category;
pub use schema::{CategorySchema, FieldSpec, FieldType, FieldValue, UnknownFieldPolicy};
pub use types::{DesiredRecord, DesiredState, Fields, SchemaViolation, ViolationKind, name_key};
