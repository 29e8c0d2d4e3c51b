//! Implementation of the `redseed validate` command.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use redseed_lib::desired::Category;

use super::load_desired;
use crate::output::{OutputFormat, print_json, print_stat, print_success};

#[derive(Serialize)]
struct ValidOutput {
  valid: bool,
  records: usize,
  categories: Vec<CategoryCount>,
}

#[derive(Serialize)]
struct CategoryCount {
  category: Category,
  records: usize,
}

/// Load and check a desired-state file. No target is contacted.
pub fn cmd_validate(file: &Path, output: OutputFormat) -> Result<bool> {
  let Some(desired) = load_desired(file, output)? else {
    return Ok(false);
  };

  if output.is_json() {
    print_json(&ValidOutput {
      valid: true,
      records: desired.len(),
      categories: desired
        .categories()
        .map(|(category, records)| CategoryCount {
          category,
          records: records.len(),
        })
        .collect(),
    })?;
  } else {
    print_success(&format!("{} is valid", file.display()));
    for (category, records) in desired.categories() {
      print_stat(category.key(), &records.len().to_string());
    }
  }

  Ok(true)
}
