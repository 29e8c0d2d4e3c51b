//! Dry-run wrapper: reads pass through, writes are only recorded.

use tracing::info;

use super::TargetAdapter;
use super::types::{ActualRecord, AdapterError, Operation, RecordId};
use crate::desired::{Category, Fields};

/// A write the wrapped adapter would have received.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedWrite {
  pub category: Category,
  pub operation: Operation,
  pub id: Option<RecordId>,
  pub fields: Fields,
}

/// Wraps an adapter so `create` and `update` never reach the target.
///
/// Created records get placeholder ids counting down from `u64::MAX` so they
/// cannot collide with ids the target handed out.
#[derive(Debug)]
pub struct DryRunAdapter<A> {
  inner: A,
  planned: Vec<PlannedWrite>,
  next_placeholder: u64,
}

impl<A: TargetAdapter> DryRunAdapter<A> {
  pub fn new(inner: A) -> Self {
    Self {
      inner,
      planned: Vec::new(),
      next_placeholder: u64::MAX,
    }
  }

  /// Writes suppressed so far, in order.
  pub fn planned(&self) -> &[PlannedWrite] {
    &self.planned
  }

  /// Writes the wrapped adapter would refuse are refused here too.
  fn check(&self, category: Category, operation: Operation) -> Result<(), AdapterError> {
    if self.inner.supports(category, operation) {
      Ok(())
    } else {
      Err(AdapterError::NotSupported { category, operation })
    }
  }
}

impl<A: TargetAdapter> TargetAdapter for DryRunAdapter<A> {
  fn describe(&self) -> String {
    format!("{} (dry run)", self.inner.describe())
  }

  fn observes(&self, category: Category, field: &str) -> bool {
    self.inner.observes(category, field)
  }

  fn supports(&self, category: Category, operation: Operation) -> bool {
    self.inner.supports(category, operation)
  }

  async fn list(&self, category: Category) -> Result<Vec<ActualRecord>, AdapterError> {
    self.inner.list(category).await
  }

  async fn create(&mut self, category: Category, fields: &Fields) -> Result<ActualRecord, AdapterError> {
    self.check(category, Operation::Create)?;
    let id = RecordId(self.next_placeholder);
    self.next_placeholder -= 1;

    info!(%category, "would create");
    self.planned.push(PlannedWrite {
      category,
      operation: Operation::Create,
      id: None,
      fields: fields.clone(),
    });
    Ok(ActualRecord::new(id, fields.clone()))
  }

  async fn update(&mut self, category: Category, id: RecordId, fields: &Fields) -> Result<ActualRecord, AdapterError> {
    self.check(category, Operation::Update)?;
    info!(%category, %id, "would update");
    self.planned.push(PlannedWrite {
      category,
      operation: Operation::Update,
      id: Some(id),
      fields: fields.clone(),
    });
    Ok(ActualRecord::new(id, fields.clone()))
  }
}
