//! Reconciliation of the target against the desired state.
//!
//! Categories are processed in their declared order and records in input
//! order. For each category the target is listed once, and that snapshot is
//! the only lookup used to decide between create, update and no-op:
//!
//! - no record with the desired name → `create` → `Created`
//! - a record whose fields differ → `update` with the merged field set → `Updated`
//! - a record whose fields match → `Unchanged`, no call
//!
//! Record-level failures become outcomes and never stop the run. A category
//! the adapter cannot list is skipped as a whole. Only authentication
//! failures and cancellation stop processing, and both hand back the partial
//! report.

mod diff;

use std::collections::HashMap;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use diff::{changed_fields, merge_fields};

use crate::desired::{Category, DesiredRecord, DesiredState, name_key};
use crate::report::{Outcome, OutcomeReport};
use crate::target::{ActualRecord, AdapterError, ErrorScope, TargetAdapter};

/// Reason recorded for every record of a category the adapter cannot list.
pub const UNSUPPORTED_CATEGORY: &str = "category not supported by this adapter";

/// Options for a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
  /// Checked before each category starts. A category in progress always completes.
  pub cancel: CancellationToken,
}

/// A run stopped before every category was processed.
///
/// Both variants carry the outcomes recorded up to that point.
#[derive(Debug, Error)]
pub enum ReconcileError {
  #[error("authentication failed while reconciling {category}: {source}")]
  Auth {
    category: Category,
    #[source]
    source: AdapterError,
    report: OutcomeReport,
  },

  #[error("reconciliation cancelled before {next}")]
  Cancelled { next: Category, report: OutcomeReport },
}

impl ReconcileError {
  /// Outcomes recorded before the run stopped.
  pub fn report(&self) -> &OutcomeReport {
    match self {
      ReconcileError::Auth { report, .. } | ReconcileError::Cancelled { report, .. } => report,
    }
  }

  pub fn into_report(self) -> OutcomeReport {
    match self {
      ReconcileError::Auth { report, .. } | ReconcileError::Cancelled { report, .. } => report,
    }
  }
}

/// Bring the target in line with `desired`.
///
/// Re-running against the same input is safe: every run starts from a fresh
/// listing, so records created by an earlier run come back as `Unchanged`.
pub async fn reconcile<A: TargetAdapter>(
  desired: &DesiredState,
  adapter: &mut A,
  options: &ReconcileOptions,
) -> Result<OutcomeReport, ReconcileError> {
  let mut report = OutcomeReport::new();
  info!(adapter = %adapter.describe(), records = desired.len(), "reconciling");

  for (category, records) in desired.categories() {
    if options.cancel.is_cancelled() {
      warn!(%category, "cancelled before category");
      return Err(ReconcileError::Cancelled { next: category, report });
    }

    if let Err(source) = reconcile_category(category, records, adapter, &mut report).await {
      error!(%category, error = %source, "aborting run");
      return Err(ReconcileError::Auth {
        category,
        source,
        report,
      });
    }
  }

  let counts = report.counts();
  info!(
    created = counts.created,
    updated = counts.updated,
    unchanged = counts.unchanged,
    failed = counts.failed,
    skipped = counts.skipped,
    "reconciliation finished"
  );
  Ok(report)
}

/// Reconcile one category. Returns `Err` only for errors that end the run.
async fn reconcile_category<A: TargetAdapter>(
  category: Category,
  records: &[DesiredRecord],
  adapter: &mut A,
  report: &mut OutcomeReport,
) -> Result<(), AdapterError> {
  let actual = match adapter.list(category).await {
    Ok(actual) => actual,
    Err(AdapterError::NotSupported { .. }) => {
      warn!(%category, records = records.len(), "skipping category");
      for record in records {
        report.record(category, record.display_name(), Outcome::skipped(UNSUPPORTED_CATEGORY));
      }
      return Ok(());
    }
    Err(e) if e.scope() == ErrorScope::Run => return Err(e),
    Err(e) => {
      error!(%category, error = %e, "failed to list");
      for record in records {
        report.record(
          category,
          record.display_name(),
          Outcome::failed(format!("could not list {}: {}", category, e)),
        );
      }
      return Ok(());
    }
  };

  debug!(%category, existing = actual.len(), desired = records.len(), "listed");

  // keyed the way the target compares names
  let mut existing: HashMap<String, ActualRecord> = HashMap::new();
  for record in actual {
    if let Some(key) = record.name().map(name_key) {
      existing.entry(key).or_insert(record);
    }
  }

  let mut lost_connection: Option<String> = None;

  for record in records {
    let label = record.display_name();

    if let Some(cause) = &lost_connection {
      report.record(
        category,
        label,
        Outcome::failed(format!("not attempted: connection lost ({})", cause)),
      );
      continue;
    }

    let Some(name) = record.name() else {
      warn!(%category, record = %label, "record has no name");
      report.record(category, label, Outcome::skipped("record has no name"));
      continue;
    };

    let desired = record.recognized_fields(category);
    let key = name_key(name);

    let result = match existing.get(&key) {
      None => adapter
        .create(category, &desired)
        .await
        .map(|created| (Outcome::Created, created)),
      Some(actual) => {
        let changed = changed_fields(category, &desired, &actual.fields, |f| adapter.observes(category, f));
        if changed.is_empty() {
          debug!(%category, record = name, "unchanged");
          report.record(category, name, Outcome::Unchanged);
          continue;
        }

        let merged = merge_fields(category, &actual.fields, &desired);
        adapter
          .update(category, actual.id, &merged)
          .await
          .map(|updated| (Outcome::Updated { changed }, updated))
      }
    };

    match result {
      Ok((outcome, after)) => {
        info!(%category, record = name, id = %after.id, outcome = %outcome.kind(), "reconciled");
        existing.insert(key, after);
        report.record(category, name, outcome);
      }
      Err(e @ AdapterError::NotSupported { .. }) => {
        warn!(%category, record = name, error = %e, "skipped");
        report.record(category, name, Outcome::skipped(&e));
      }
      Err(e) => {
        error!(%category, record = name, error = %e, "failed");
        report.record(category, name, Outcome::failed(&e));
        match e.scope() {
          ErrorScope::Run => return Err(e),
          ErrorScope::Category => lost_connection = Some(e.to_string()),
          ErrorScope::Record => {}
        }
      }
    }
  }

  Ok(())
}
