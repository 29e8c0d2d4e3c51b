//! Field-level comparison between a desired record and what the target holds.

use crate::desired::{Category, Fields};

/// Names of desired fields whose value differs from the actual record.
///
/// Both sides are coerced to the field's declared type before comparing, so
/// `"1"`, `1` and `1.0` are the same position. Only fields present in
/// `desired` are looked at: an absent desired field never counts as a change.
/// Fields for which `observes` returns false are skipped, since the target
/// never reports them.
pub fn changed_fields(
  category: Category,
  desired: &Fields,
  actual: &Fields,
  observes: impl Fn(&str) -> bool,
) -> Vec<String> {
  let schema = category.schema();
  let mut changed = Vec::new();

  for (field, want) in desired {
    if want.is_null() || !observes(field) {
      continue;
    }

    let differs = match schema.field(field) {
      Some(spec) => match spec.ty.coerce(want) {
        Some(want) => actual.get(field).and_then(|have| spec.ty.coerce(have)) != Some(want),
        // only reachable for unvalidated input
        None => actual.get(field) != Some(want),
      },
      None => actual.get(field) != Some(want),
    };

    if differs {
      changed.push(field.clone());
    }
  }

  changed
}

/// The full field set for an update: recognized actual fields overlaid with the desired ones.
pub fn merge_fields(category: Category, actual: &Fields, desired: &Fields) -> Fields {
  let schema = category.schema();
  let mut merged: Fields = actual
    .iter()
    .filter(|(field, _)| schema.recognizes(field))
    .map(|(field, value)| (field.clone(), value.clone()))
    .collect();
  merged.extend(desired.iter().map(|(field, value)| (field.clone(), value.clone())));
  merged
}
