mod apply;
mod plan;
mod validate;

pub use apply::cmd_apply;
pub use plan::cmd_plan;
pub use validate::cmd_validate;

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use redseed_lib::config::{ConfigError, RemoteConfig};
use redseed_lib::desired::DesiredState;
use redseed_lib::platform::paths::default_store_path;
use redseed_lib::reconcile::{ReconcileError, ReconcileOptions, reconcile};
use redseed_lib::report::{OutcomeCounts, OutcomeReport};
use redseed_lib::target::{DirectAdapter, DryRunAdapter, RemoteAdapter, TargetAdapter};

use crate::output::{OutputFormat, print_json, print_report, print_violations};

/// Which system receives the writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TargetKind {
  /// The running server's HTTP API
  #[default]
  Remote,
  /// A local data store file
  Direct,
}

/// Target selection flags shared by `apply` and `plan`.
#[derive(Debug, Args)]
pub struct TargetArgs {
  /// Target to reconcile against
  #[arg(long, value_enum, default_value_t = TargetKind::Remote)]
  pub target: TargetKind,

  /// Data store file for the direct target
  #[arg(long, value_name = "PATH")]
  pub store: Option<PathBuf>,

  /// Base URL of the remote target (overrides REDMICA_URL)
  #[arg(long, value_name = "URL")]
  pub url: Option<String>,

  /// Per-request timeout for the remote target, e.g. `10s`
  #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
  pub timeout: Option<Duration>,

  /// Status id given to trackers created on the remote target
  #[arg(long, value_name = "ID")]
  pub tracker_default_status: Option<u64>,
}

impl TargetArgs {
  fn store_path(&self) -> PathBuf {
    self.store.clone().unwrap_or_else(default_store_path)
  }

  fn remote_config(&self) -> Result<RemoteConfig, ConfigError> {
    let mut config = RemoteConfig::from_env()?;
    if let Some(url) = &self.url {
      config = config.with_base_url(url)?;
    }
    if let Some(timeout) = self.timeout {
      config = config.with_timeout(timeout);
    }
    if let Some(status_id) = self.tracker_default_status {
      config = config.with_tracker_default_status(status_id);
    }
    Ok(config)
  }
}

/// Load a desired-state file.
///
/// Schema violations are rendered here and yield `None`; any other problem is an error.
fn load_desired(file: &Path, output: OutputFormat) -> Result<Option<DesiredState>> {
  match DesiredState::load(file) {
    Ok(desired) => Ok(Some(desired)),
    Err(ConfigError::Schema(violations)) => {
      print_violations(file, &violations, output)?;
      Ok(None)
    }
    Err(e) => Err(e).with_context(|| format!("Failed to load desired state: {}", file.display())),
  }
}

/// Reconcile `desired` against the selected target and render the outcome.
///
/// Returns true when every record succeeded and the run was not aborted.
fn run(file: &Path, target: &TargetArgs, dry_run: bool, output: OutputFormat) -> Result<bool> {
  let Some(desired) = load_desired(file, output)? else {
    return Ok(false);
  };

  let start = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  let result = match target.target {
    TargetKind::Direct => {
      let path = target.store_path();
      let adapter =
        DirectAdapter::open(&path).with_context(|| format!("Failed to open data store: {}", path.display()))?;
      rt.block_on(drive(&desired, adapter, dry_run))
    }
    TargetKind::Remote => {
      let config = target.remote_config().context("Invalid remote target configuration")?;
      let adapter = RemoteAdapter::new(config).context("Failed to set up remote target")?;
      rt.block_on(drive(&desired, adapter, dry_run))
    }
  };

  let (report, aborted) = match result {
    Ok(report) => (report, None),
    Err(e) => {
      let message = e.to_string();
      (e.into_report(), Some(message))
    }
  };

  let succeeded = aborted.is_none() && !report.has_failures();
  if output.is_json() {
    print_json(&RunOutput {
      dry_run,
      succeeded,
      aborted: aborted.as_deref(),
      report: &report,
      counts: report.counts(),
    })?;
  } else {
    print_report(&report, dry_run, aborted.as_deref(), start.elapsed());
  }

  Ok(succeeded)
}

/// Run the reconciler with Ctrl-C wired to its cancellation token.
async fn drive<A: TargetAdapter>(
  desired: &DesiredState,
  mut adapter: A,
  dry_run: bool,
) -> Result<OutcomeReport, ReconcileError> {
  let options = ReconcileOptions::default();
  let interrupt = tokio::spawn(watch_interrupts(tokio::signal::ctrl_c, options.cancel.clone(), || {
    std::process::exit(INTERRUPTED_EXIT_CODE)
  }));

  info!(adapter = %adapter.describe(), dry_run, "starting run");
  let result = if dry_run {
    let mut dry = DryRunAdapter::new(adapter);
    let result = reconcile(desired, &mut dry, &options).await;
    info!(writes = dry.planned().len(), "planned writes");
    result
  } else {
    reconcile(desired, &mut adapter, &options).await
  };

  interrupt.abort();
  result
}

/// Exit status after a forced stop, as a shell reports SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// First interrupt cancels `cancel`; a second one calls `force_exit`.
///
/// Listening for Ctrl-C replaces the default handler, so the second press
/// has to end the process here.
async fn watch_interrupts<S, F>(mut next_interrupt: S, cancel: CancellationToken, force_exit: impl FnOnce())
where
  S: FnMut() -> F,
  F: Future<Output = io::Result<()>>,
{
  if next_interrupt().await.is_err() {
    return;
  }
  warn!("interrupted, stopping before the next category (press Ctrl-C again to exit now)");
  cancel.cancel();

  if next_interrupt().await.is_ok() {
    warn!("interrupted again, exiting");
    force_exit();
  }
}

#[derive(Serialize)]
struct RunOutput<'a> {
  dry_run: bool,
  succeeded: bool,
  aborted: Option<&'a str>,
  counts: OutcomeCounts,
  #[serde(flatten)]
  report: &'a OutcomeReport,
}
