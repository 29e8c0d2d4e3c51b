//! Outcome reporting.
//!
//! The reconciler appends one [`OutcomeEntry`] per desired record to an
//! [`OutcomeReport`]. The report is pure aggregation: it never does I/O and is
//! the only thing handed to the presentation layer.

use std::fmt;

use serde::Serialize;

use crate::desired::Category;

/// Result of reconciling one desired record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  /// The record did not exist and was created.
  Created,
  /// The record existed with different values; `changed` names the fields.
  Updated { changed: Vec<String> },
  /// The record already matched.
  Unchanged,
  /// The target rejected or could not process the record.
  Failed { reason: String },
  /// The record was deliberately not processed.
  Skipped { reason: String },
}

impl Outcome {
  pub fn failed(reason: impl fmt::Display) -> Self {
    Outcome::Failed {
      reason: reason.to_string(),
    }
  }

  pub fn skipped(reason: impl fmt::Display) -> Self {
    Outcome::Skipped {
      reason: reason.to_string(),
    }
  }

  pub fn kind(&self) -> OutcomeKind {
    match self {
      Outcome::Created => OutcomeKind::Created,
      Outcome::Updated { .. } => OutcomeKind::Updated,
      Outcome::Unchanged => OutcomeKind::Unchanged,
      Outcome::Failed { .. } => OutcomeKind::Failed,
      Outcome::Skipped { .. } => OutcomeKind::Skipped,
    }
  }

  /// The failure or skip reason, if any.
  pub fn reason(&self) -> Option<&str> {
    match self {
      Outcome::Failed { reason } | Outcome::Skipped { reason } => Some(reason),
      _ => None,
    }
  }
}

/// Payload-free discriminant of [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
  Created,
  Updated,
  Unchanged,
  Failed,
  Skipped,
}

impl fmt::Display for OutcomeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OutcomeKind::Created => f.write_str("created"),
      OutcomeKind::Updated => f.write_str("updated"),
      OutcomeKind::Unchanged => f.write_str("unchanged"),
      OutcomeKind::Failed => f.write_str("failed"),
      OutcomeKind::Skipped => f.write_str("skipped"),
    }
  }
}

/// One reconciled record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeEntry {
  pub category: Category,
  pub name: String,
  #[serde(flatten)]
  pub outcome: Outcome,
}

/// Totals per outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
  pub created: usize,
  pub updated: usize,
  pub unchanged: usize,
  pub failed: usize,
  pub skipped: usize,
}

impl OutcomeCounts {
  pub fn get(&self, kind: OutcomeKind) -> usize {
    match kind {
      OutcomeKind::Created => self.created,
      OutcomeKind::Updated => self.updated,
      OutcomeKind::Unchanged => self.unchanged,
      OutcomeKind::Failed => self.failed,
      OutcomeKind::Skipped => self.skipped,
    }
  }

  pub fn total(&self) -> usize {
    self.created + self.updated + self.unchanged + self.failed + self.skipped
  }
}

/// Append-only collection of outcomes in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeReport {
  entries: Vec<OutcomeEntry>,
}

impl OutcomeReport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, category: Category, name: impl Into<String>, outcome: Outcome) {
    self.entries.push(OutcomeEntry {
      category,
      name: name.into(),
      outcome,
    });
  }

  pub fn entries(&self) -> &[OutcomeEntry] {
    &self.entries
  }

  pub fn for_category(&self, category: Category) -> impl Iterator<Item = &OutcomeEntry> {
    self.entries.iter().filter(move |e| e.category == category)
  }

  /// Outcome recorded for a record, if any.
  pub fn get(&self, category: Category, name: &str) -> Option<&Outcome> {
    self
      .entries
      .iter()
      .find(|e| e.category == category && e.name == name)
      .map(|e| &e.outcome)
  }

  pub fn counts(&self) -> OutcomeCounts {
    let mut counts = OutcomeCounts::default();
    for entry in &self.entries {
      match entry.outcome.kind() {
        OutcomeKind::Created => counts.created += 1,
        OutcomeKind::Updated => counts.updated += 1,
        OutcomeKind::Unchanged => counts.unchanged += 1,
        OutcomeKind::Failed => counts.failed += 1,
        OutcomeKind::Skipped => counts.skipped += 1,
      }
    }
    counts
  }

  pub fn has_failures(&self) -> bool {
    self.entries.iter().any(|e| e.outcome.kind() == OutcomeKind::Failed)
  }

  /// Returns true if anything was created or updated.
  pub fn has_changes(&self) -> bool {
    self
      .entries
      .iter()
      .any(|e| matches!(e.outcome.kind(), OutcomeKind::Created | OutcomeKind::Updated))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
