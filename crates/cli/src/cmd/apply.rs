//! Implementation of the `redseed apply` command.
//!
//! Loads a desired-state file and writes whatever is missing or different to
//! the selected target. Records that already match are left alone, so running
//! it twice is safe.

use std::path::Path;

use anyhow::Result;

use super::{TargetArgs, run};
use crate::output::OutputFormat;

/// Execute the apply command.
///
/// Returns false when any record failed or the run was aborted.
pub fn cmd_apply(file: &Path, target: &TargetArgs, output: OutputFormat) -> Result<bool> {
  run(file, target, false, output)
}
