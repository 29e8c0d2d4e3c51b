//! Entity categories and their processing order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A class of configuration entity in the target system.
///
/// Variants are declared in processing order: statuses and priorities may be
/// referenced by entities created later, so trackers go first and document
/// categories last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Trackers,
  IssueStatuses,
  IssuePriorities,
  TimeEntryActivities,
  DocumentCategories,
}

impl Category {
  /// Every category, in processing order.
  pub const ALL: [Category; 5] = [
    Category::Trackers,
    Category::IssueStatuses,
    Category::IssuePriorities,
    Category::TimeEntryActivities,
    Category::DocumentCategories,
  ];

  /// Top-level key of the category in the desired-state document and in list responses.
  pub fn key(self) -> &'static str {
    match self {
      Category::Trackers => "trackers",
      Category::IssueStatuses => "issue_statuses",
      Category::IssuePriorities => "issue_priorities",
      Category::TimeEntryActivities => "time_entry_activities",
      Category::DocumentCategories => "document_categories",
    }
  }

  /// Key wrapping a single record in create/update request bodies.
  pub fn singular_key(self) -> &'static str {
    match self {
      Category::Trackers => "tracker",
      Category::IssueStatuses => "issue_status",
      Category::IssuePriorities => "issue_priority",
      Category::TimeEntryActivities => "time_entry_activity",
      Category::DocumentCategories => "document_category",
    }
  }

  /// Human-readable label used in log lines.
  pub fn label(self) -> &'static str {
    match self {
      Category::Trackers => "tracker",
      Category::IssueStatuses => "issue status",
      Category::IssuePriorities => "issue priority",
      Category::TimeEntryActivities => "time entry activity",
      Category::DocumentCategories => "document category",
    }
  }

  /// Resolve a document key, including the `statuses` alias.
  pub fn from_key(key: &str) -> Option<Category> {
    match key {
      "trackers" => Some(Category::Trackers),
      "issue_statuses" | "statuses" => Some(Category::IssueStatuses),
      "issue_priorities" => Some(Category::IssuePriorities),
      "time_entry_activities" => Some(Category::TimeEntryActivities),
      "document_categories" => Some(Category::DocumentCategories),
      _ => None,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.key())
  }
}

impl FromStr for Category {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Category::from_key(s).ok_or_else(|| format!("unknown category '{}'", s))
  }
}
