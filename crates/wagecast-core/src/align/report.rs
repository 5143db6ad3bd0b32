use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What alignment does with a categorical level that has no schema column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnknownCategoryPolicy {
    /// Drop the indicator; the record counts as "none of the known levels"
    /// for that field.
    #[default]
    ZeroFill,
    /// Fail alignment with `WagecastError::UnknownCategory`.
    Reject,
}

impl fmt::Display for UnknownCategoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFill => write!(f, "zero-fill"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// A categorical level that was zero-filled during alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownValue {
    /// Row index within the aligned batch.
    pub row: usize,
    pub field: String,
    pub value: String,
}

/// Per-request account of what reindexing discarded or filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Number of aligned rows.
    pub rows: usize,
    /// Categorical levels dropped because the schema has no column for them.
    pub unknown_values: Vec<UnknownValue>,
    /// Fields with no schema column at all (e.g. a column dropped before
    /// training). Sorted, deduplicated.
    pub inert_fields: BTreeSet<String>,
    /// Schema cells, summed over rows, that no expanded column supplied.
    pub zero_filled_cells: usize,
}

impl AlignmentReport {
    /// Number of unknown categorical levels that were zero-filled.
    #[must_use]
    pub fn unknown_count(&self) -> usize {
        self.unknown_values.len()
    }

    /// Returns `true` if every categorical level was recognized.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unknown_values.is_empty()
    }

    /// Unknown levels reported for one row.
    pub fn unknown_in_row(&self, row: usize) -> impl Iterator<Item = &UnknownValue> {
        self.unknown_values.iter().filter(move |u| u.row == row)
    }
}

impl fmt::Display for AlignmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row(s), {} unknown value(s) zero-filled",
            self.rows,
            self.unknown_count()
        )?;
        if !self.inert_fields.is_empty() {
            let fields: Vec<&str> = self.inert_fields.iter().map(String::as_str).collect();
            write!(f, ", ignored fields: {}", fields.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_zero_fills() {
        assert_eq!(UnknownCategoryPolicy::default(), UnknownCategoryPolicy::ZeroFill);
        assert_eq!(UnknownCategoryPolicy::Reject.to_string(), "reject");
    }

    #[test]
    fn report_display() {
        let mut report = AlignmentReport {
            rows: 2,
            ..Default::default()
        };
        assert!(report.is_clean());
        report.unknown_values.push(UnknownValue {
            row: 1,
            field: "workclass".into(),
            value: "Government".into(),
        });
        report.inert_fields.insert("education".into());

        assert_eq!(report.unknown_count(), 1);
        assert_eq!(report.unknown_in_row(1).count(), 1);
        assert_eq!(report.unknown_in_row(0).count(), 0);
        assert_eq!(
            report.to_string(),
            "2 row(s), 1 unknown value(s) zero-filled, ignored fields: education"
        );
    }
}
