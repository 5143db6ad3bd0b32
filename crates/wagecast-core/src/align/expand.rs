//! Dummy expansion of raw records.

use crate::types::{RawRecord, RawValue};

/// Origin of an expanded column, kept so reindexing can tell a dropped
/// indicator apart from a dropped numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrigin<'a> {
    /// A numeric field, kept under its own name.
    Numeric { field: &'a str },
    /// An indicator for one level of a categorical field.
    Indicator { field: &'a str, level: &'a str },
}

impl<'a> ColumnOrigin<'a> {
    #[must_use]
    pub fn field(&self) -> &'a str {
        match *self {
            Self::Numeric { field } | Self::Indicator { field, .. } => field,
        }
    }
}

/// One column produced by expanding a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedColumn<'a> {
    pub name: String,
    pub value: f32,
    pub origin: ColumnOrigin<'a>,
}

/// Name of the indicator column for one categorical level.
#[must_use]
pub fn dummy_column(field: &str, level: &str) -> String {
    format!("{field}_{level}")
}

/// Expands a record into numeric columns.
///
/// Numeric fields keep their name and value (`NaN` included). Each categorical
/// field becomes a single `<field>_<value>` indicator set to 1. Missing fields
/// produce nothing.
#[must_use]
pub fn expand(record: &RawRecord) -> Vec<ExpandedColumn<'_>> {
    record
        .iter()
        .filter_map(|(field, value)| match value {
            RawValue::Number(n) => Some(ExpandedColumn {
                name: field.to_string(),
                value: *n as f32,
                origin: ColumnOrigin::Numeric { field },
            }),
            RawValue::Text(level) => Some(ExpandedColumn {
                name: dummy_column(field, level),
                value: 1.0,
                origin: ColumnOrigin::Indicator {
                    field,
                    level: level.as_str(),
                },
            }),
            RawValue::Missing => None,
        })
        .collect()
}
