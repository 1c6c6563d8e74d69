use std::collections::HashMap;

use crate::mapping::ResolvedRule;
use crate::value::Value;

/// Duplicate bookkeeping for one unique-flagged field.
///
/// Values are keyed by their canonical text rendering. Row numbers are
/// 1-based data rows. `not_unique` holds the full occurrence list of every
/// value seen at least twice; `not_unique_count` totals the occurrences
/// beyond each value's first and stays correct after every recorded row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldUniques {
    /// Resolved column index the field reads from
    pub column: usize,
    /// Every value seen, with the rows it appeared on
    pub seen: HashMap<String, Vec<usize>>,
    /// Values seen at least twice, with all their rows
    pub not_unique: HashMap<String, Vec<usize>>,
    /// Total duplicate occurrences beyond each value's first
    pub not_unique_count: usize,
}

impl FieldUniques {
    fn new(column: usize) -> Self {
        Self {
            column,
            ..Self::default()
        }
    }

    /// Records one coerced value at a 1-based data row.
    fn record(&mut self, value: &Value, row: usize) {
        let key = value.to_string();
        let rows = self.seen.entry(key.clone()).or_default();
        rows.push(row);
        if rows.len() == 2 {
            self.not_unique.insert(key, rows.clone());
            self.not_unique_count += 1;
        } else if rows.len() > 2 {
            if let Some(duplicates) = self.not_unique.get_mut(&key) {
                duplicates.push(row);
            }
            self.not_unique_count += 1;
        }
    }
}

/// Per-field duplicate tracking across one read pass.
/// Owned by the workbook and rebuilt whenever a mapped read starts.
#[derive(Clone, Debug, Default)]
pub(crate) struct UniquenessTracker {
    fields: HashMap<String, FieldUniques>,
}

impl UniquenessTracker {
    /// Builds empty records for the unique-flagged rules of a pass.
    pub(crate) fn new(rules: &[ResolvedRule]) -> Self {
        Self {
            fields: rules
                .iter()
                .filter(|rule| rule.unique)
                .map(|rule| (rule.field.to_owned(), FieldUniques::new(rule.column)))
                .collect(),
        }
    }

    /// Records a coerced value for a tracked field.
    /// Fields without the unique flag are ignored.
    pub(crate) fn record(&mut self, field: &str, value: &Value, row: usize) {
        if let Some(uniques) = self.fields.get_mut(field) {
            uniques.record(value, row);
        }
    }

    /// The records gathered so far, keyed by field name.
    pub(crate) fn fields(&self) -> &HashMap<String, FieldUniques> {
        &self.fields
    }
}
