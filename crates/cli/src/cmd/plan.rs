//! Implementation of the `redseed plan` command.
//!
//! Same reconciliation as `apply`, with the target wrapped so listings are real
//! but creates and updates are only recorded.

use std::path::Path;

use anyhow::Result;

use super::{TargetArgs, run};
use crate::output::OutputFormat;

pub fn cmd_plan(file: &Path, target: &TargetArgs, output: OutputFormat) -> Result<bool> {
  run(file, target, true, output)
}
