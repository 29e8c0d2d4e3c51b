//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, run reports, and Unicode symbols.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use redseed_lib::desired::{Category, SchemaViolation};
use redseed_lib::report::{Outcome, OutcomeCounts, OutcomeKind, OutcomeReport};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const SAME: &str = "=";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// `created`, or `would create` for a plan.
fn describe(outcome: &Outcome, dry_run: bool) -> String {
  match (outcome, dry_run) {
    (Outcome::Created, false) => "created".to_string(),
    (Outcome::Created, true) => "would create".to_string(),
    (Outcome::Updated { changed }, false) => format!("updated: {}", changed.join(", ")),
    (Outcome::Updated { changed }, true) => format!("would update: {}", changed.join(", ")),
    (Outcome::Unchanged, _) => "unchanged".to_string(),
    (Outcome::Failed { reason }, _) => format!("failed: {}", reason),
    (Outcome::Skipped { reason }, _) => format!("skipped: {}", reason),
  }
}

fn print_entry(name: &str, outcome: &Outcome, dry_run: bool) {
  let detail = format!("({})", describe(outcome, dry_run));
  match outcome.kind() {
    OutcomeKind::Created => println!(
      "  {} {} {}",
      symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()),
      name,
      detail.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
    OutcomeKind::Updated => println!(
      "  {} {} {}",
      symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
      name,
      detail.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
    OutcomeKind::Unchanged => println!(
      "  {} {} {}",
      symbols::SAME.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      name,
      detail.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
    OutcomeKind::Failed => println!(
      "  {} {} {}",
      symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
      name,
      detail.if_supports_color(Stream::Stdout, |s| s.red())
    ),
    OutcomeKind::Skipped => println!(
      "  {} {} {}",
      symbols::WARNING.if_supports_color(Stream::Stdout, |s| s.yellow()),
      name,
      detail.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
  }
}

fn print_counts(counts: &OutcomeCounts, dry_run: bool) {
  let (created, updated) = if dry_run {
    ("To create", "To update")
  } else {
    ("Created", "Updated")
  };
  print_stat(created, &counts.created.to_string());
  print_stat(updated, &counts.updated.to_string());
  print_stat("Unchanged", &counts.unchanged.to_string());
  print_stat("Failed", &counts.failed.to_string());
  print_stat("Skipped", &counts.skipped.to_string());
}

/// Per-category outcome listing followed by totals.
pub fn print_report(report: &OutcomeReport, dry_run: bool, aborted: Option<&str>, elapsed: Duration) {
  for category in Category::ALL {
    let mut entries = report.for_category(category).peekable();
    if entries.peek().is_none() {
      continue;
    }

    println!("{}", category.key().if_supports_color(Stream::Stdout, |s| s.bold()));
    for entry in entries {
      print_entry(&entry.name, &entry.outcome, dry_run);
    }
  }

  println!();
  if let Some(reason) = aborted {
    print_error(&format!("Run aborted: {}", reason));
  } else if report.has_failures() {
    print_warning("Completed with failures");
  } else if dry_run {
    print_info("Dry run - no changes made");
  } else {
    print_success("Apply complete!");
  }

  print_counts(&report.counts(), dry_run);
  print_stat("Duration", &format_duration(elapsed));
}

#[derive(Serialize)]
struct InvalidOutput<'a> {
  valid: bool,
  violations: &'a [SchemaViolation],
}

/// Render every schema violation of a document that failed to load.
pub fn print_violations(file: &Path, violations: &[SchemaViolation], output: OutputFormat) -> anyhow::Result<()> {
  if output.is_json() {
    return print_json(&InvalidOutput {
      valid: false,
      violations,
    });
  }

  print_error(&format!(
    "{} has {} schema violation(s)",
    file.display(),
    violations.len()
  ));
  for violation in violations {
    eprintln!("  {} {}", symbols::ARROW, violation);
  }
  Ok(())
}
