//! Access to the target system.
//!
//! The reconciler only ever talks to a [`TargetAdapter`]. Two backends exist:
//!
//! - [`DirectAdapter`]: mutates a local [`DataStore`] in-process
//! - [`RemoteAdapter`]: authenticated calls against the target's HTTP API
//!
//! [`DryRunAdapter`] wraps either one and turns writes into no-ops, which is
//! how `plan` answers "what would change" with the same reconciliation logic.

mod direct;
mod dry_run;
mod remote;
mod store;
mod types;

use std::future::Future;

pub use direct::DirectAdapter;
pub use dry_run::{DryRunAdapter, PlannedWrite};
pub use remote::RemoteAdapter;
pub use store::{DataStore, STORE_VERSION, StoreError};
pub use types::{ActualRecord, AdapterError, ErrorScope, Operation, RecordId};

use crate::desired::{Category, Fields};

/// Query and mutate entities in the target system.
///
/// `list` is read-only; `create` and `update` change target state. Failures
/// are reported as [`AdapterError`]s whose [`scope`](AdapterError::scope)
/// tells the caller how far they reach.
pub trait TargetAdapter {
  /// Short description of the target, for logs.
  fn describe(&self) -> String;

  /// Whether listings report `field` for `category` at all.
  ///
  /// Fields a backend never reports cannot be compared.
  fn observes(&self, category: Category, field: &str) -> bool {
    let _ = (category, field);
    true
  }

  /// Whether `operation` on `category` can be attempted at all.
  fn supports(&self, category: Category, operation: Operation) -> bool {
    let _ = (category, operation);
    true
  }

  /// Every existing record of a category.
  fn list(&self, category: Category) -> impl Future<Output = Result<Vec<ActualRecord>, AdapterError>>;

  /// Create a record from a complete field set.
  fn create(&mut self, category: Category, fields: &Fields) -> impl Future<Output = Result<ActualRecord, AdapterError>>;

  /// Replace the fields of an existing record.
  fn update(
    &mut self,
    category: Category,
    id: RecordId,
    fields: &Fields,
  ) -> impl Future<Output = Result<ActualRecord, AdapterError>>;
}
