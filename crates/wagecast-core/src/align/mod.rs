//! # Feature Alignment
//!
//! Projects raw records onto the column set a model was trained on.
//!
//! Alignment runs in two steps:
//! 1. **Expand**: every categorical field becomes a `<field>_<value>`
//!    indicator, numeric fields keep their name.
//! 2. **Reindex**: expanded columns are placed at their schema position;
//!    schema columns nobody supplied stay 0 and expanded columns outside the
//!    schema are dropped.
//!
//! The output always has exactly the schema's columns, in schema order, one
//! row per input record. A single record is aligned as a batch of one, so a
//! record produces the same row whether it is aligned alone or in a batch.
//!
//! ```rust
//! use wagecast_core::align::{FeatureAligner, UnknownCategoryPolicy};
//! use wagecast_core::types::{FeatureSchema, RawRecord};
//!
//! let schema = FeatureSchema::new(["age", "gender_Male", "gender_Female", "workclass_Private"]).unwrap();
//! let aligner = FeatureAligner::new(schema, UnknownCategoryPolicy::ZeroFill);
//!
//! let record = RawRecord::new().with("age", 45).with("gender", "Female").with("workclass", "Government");
//! let aligned = aligner.align(&record).unwrap();
//!
//! assert_eq!(aligned.row(0).to_vec(), vec![45.0, 0.0, 1.0, 0.0]);
//! assert_eq!(aligned.report().unknown_count(), 1);
//! ```

pub mod expand;
pub mod report;

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, ArrayViewMut1};
use tracing::{debug, warn};

use crate::error::{Result, WagecastError};
use crate::table::RawTable;
use crate::types::{FeatureSchema, RawRecord};

pub use expand::{ColumnOrigin, ExpandedColumn, dummy_column, expand};
pub use report::{AlignmentReport, UnknownCategoryPolicy, UnknownValue};

/// Encoded rows plus the report of what reindexing did to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    matrix: Array2<f32>,
    report: AlignmentReport,
}

impl Alignment {
    /// The encoded table: one row per record, one column per schema column.
    #[must_use]
    pub fn matrix(&self) -> &Array2<f32> {
        &self.matrix
    }

    /// One encoded vector.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn row(&self, index: usize) -> ArrayView1<'_, f32> {
        self.matrix.row(index)
    }

    #[must_use]
    pub fn report(&self) -> &AlignmentReport {
        &self.report
    }

    #[must_use]
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    #[must_use]
    pub fn into_parts(self) -> (Array2<f32>, AlignmentReport) {
        (self.matrix, self.report)
    }
}

/// Aligns raw records against a fixed [`FeatureSchema`].
#[derive(Debug, Clone)]
pub struct FeatureAligner {
    schema: FeatureSchema,
    policy: UnknownCategoryPolicy,
}

impl FeatureAligner {
    #[must_use]
    pub fn new(schema: FeatureSchema, policy: UnknownCategoryPolicy) -> Self {
        Self { schema, policy }
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }

    /// Aligns one record into a single-row table.
    pub fn align(&self, record: &RawRecord) -> Result<Alignment> {
        self.align_batch(std::slice::from_ref(record))
    }

    /// Aligns every row of a parsed table.
    pub fn align_table(&self, table: &RawTable) -> Result<Alignment> {
        self.align_batch(table.rows())
    }

    /// Aligns a batch of records, preserving order.
    ///
    /// # Errors
    ///
    /// Returns `WagecastError::UnknownCategory` for the first unseen
    /// categorical level when the policy is [`UnknownCategoryPolicy::Reject`].
    pub fn align_batch(&self, records: &[RawRecord]) -> Result<Alignment> {
        let mut matrix = Array2::<f32>::zeros((records.len(), self.schema.len()));
        let mut report = AlignmentReport {
            rows: records.len(),
            ..Default::default()
        };
        let mut covered: HashMap<&str, bool> = HashMap::new();

        for (index, (record, row)) in records.iter().zip(matrix.rows_mut()).enumerate() {
            self.align_row(index, record, row, &mut report, &mut covered)?;
        }

        if !report.is_clean() {
            warn!(
                unknown = report.unknown_count(),
                rows = report.rows,
                "zero-filled unknown categorical values"
            );
        }
        if !report.inert_fields.is_empty() {
            debug!(fields = ?report.inert_fields, "ignored fields with no schema columns");
        }

        Ok(Alignment { matrix, report })
    }

    fn align_row<'r>(
        &self,
        index: usize,
        record: &'r RawRecord,
        mut row: ArrayViewMut1<'_, f32>,
        report: &mut AlignmentReport,
        covered: &mut HashMap<&'r str, bool>,
    ) -> Result<()> {
        let mut filled = vec![false; self.schema.len()];

        for column in expand(record) {
            if let Some(pos) = self.schema.position(&column.name) {
                row[pos] = column.value;
                filled[pos] = true;
                continue;
            }

            let field = column.origin.field();
            let known_field = *covered
                .entry(field)
                .or_insert_with(|| self.schema.covers_field(field));

            match column.origin {
                ColumnOrigin::Indicator { field, level } if known_field => match self.policy {
                    UnknownCategoryPolicy::ZeroFill => {
                        debug!(row = index, field, level, "unknown category zero-filled");
                        report.unknown_values.push(UnknownValue {
                            row: index,
                            field: field.to_string(),
                            value: level.to_string(),
                        });
                    }
                    UnknownCategoryPolicy::Reject => {
                        return Err(WagecastError::UnknownCategory {
                            field: field.to_string(),
                            value: level.to_string(),
                        });
                    }
                },
                _ => {
                    report.inert_fields.insert(field.to_string());
                }
            }
        }

        report.zero_filled_cells += filled.iter().filter(|f| !**f).count();
        Ok(())
    }
}
