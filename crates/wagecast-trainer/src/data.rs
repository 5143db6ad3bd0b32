//! Dataset preparation: row filtering, column selection and encoding.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, bail};
use ndarray::{Array2, Axis};
use tracing::{info, warn};
use wagecast_core::align::{FeatureAligner, UnknownCategoryPolicy, dummy_column};
use wagecast_core::{FeatureSchema, RawRecord, RawTable, RawValue};

use crate::config::{CategoricalEncoding, TrainingConfig};

/// Encoded features and integer class targets.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDataset {
    pub schema: FeatureSchema,
    pub features: Array2<f32>,
    pub targets: Vec<usize>,
    /// Class labels in sorted order; `targets` index into this.
    pub labels: Vec<String>,
}

impl EncodedDataset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Copies the given rows, in the given order.
    #[must_use]
    pub fn subset(&self, rows: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            features: self.features.select(Axis(0), rows),
            targets: rows.iter().map(|&r| self.targets[r]).collect(),
            labels: self.labels.clone(),
        }
    }
}

/// Applies the fixed preprocessing pipeline to a raw table.
///
/// 1. keep rows whose age lies in the configured range
/// 2. drop the configured low-value columns
/// 3. separate the target column
/// 4. drop rows with a missing target or a missing numeric feature
/// 5. encode categorical columns
pub fn prepare(mut table: RawTable, config: &TrainingConfig) -> anyhow::Result<EncodedDataset> {
    if !table.has_column(&config.target_column) {
        bail!("target column {:?} not found", config.target_column);
    }
    if !table.has_column(&config.age_column) {
        bail!("age column {:?} not found", config.age_column);
    }

    let before = table.len();
    table.retain_rows(|row| {
        row.get(&config.age_column)
            .and_then(RawValue::as_number)
            .is_some_and(|age| config.age_range.contains(&age))
    });
    info!(kept = table.len(), dropped = before - table.len(), "filtered rows by age");

    for column in &config.drop_columns {
        if !table.drop_column(column) {
            warn!(column, "configured drop column not present");
        }
    }

    let categorical: BTreeSet<&str> = table
        .columns()
        .iter()
        .filter(|c| **c != config.target_column)
        .filter(|c| {
            config.categorical_columns.contains(*c)
                || table
                    .rows()
                    .iter()
                    .any(|r| r.get(c.as_str()).is_some_and(RawValue::is_categorical))
        })
        .map(String::as_str)
        .collect();
    for column in &categorical {
        if !config.categorical_columns.iter().any(|c| c.as_str() == *column) {
            warn!(column, "text column not in categorical list, encoding it anyway");
        }
    }

    let mut records: Vec<RawRecord> = Vec::with_capacity(table.len());
    let mut targets_raw: Vec<String> = Vec::with_capacity(table.len());
    let mut incomplete = 0usize;
    for row in table.rows() {
        let target = match row.get(&config.target_column) {
            Some(RawValue::Missing) | None => None,
            Some(RawValue::Number(n)) if n.is_nan() => None,
            Some(value) => Some(value.to_string()),
        };
        let has_nan = row
            .iter()
            .any(|(name, v)| !categorical.contains(name) && v.as_number().is_some_and(f64::is_nan));
        let Some(target) = target.filter(|_| !has_nan) else {
            incomplete += 1;
            continue;
        };

        let record: RawRecord = row
            .iter()
            .filter(|(name, _)| *name != config.target_column)
            .map(|(name, value)| {
                let value = match value {
                    RawValue::Number(n) if categorical.contains(name) => {
                        RawValue::Text(RawValue::Number(*n).to_string())
                    }
                    other => other.clone(),
                };
                (name, value)
            })
            .collect();
        records.push(record);
        targets_raw.push(target);
    }
    if incomplete > 0 {
        warn!(rows = incomplete, "dropped rows with missing target or numeric values");
    }
    if records.is_empty() {
        bail!("no usable rows after preprocessing");
    }

    let labels: Vec<String> = targets_raw
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let targets = targets_raw
        .iter()
        .map(|t| labels.binary_search(t).unwrap_or_default())
        .collect();

    let feature_columns: Vec<&str> = table
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| *c != config.target_column)
        .collect();

    let (schema, features) = match config.encoding {
        CategoricalEncoding::OneHot => one_hot(&records, &feature_columns, &categorical)?,
        CategoricalEncoding::Label => label_encode(&records, &feature_columns, &categorical)?,
    };

    info!(
        rows = records.len(),
        features = schema.len(),
        classes = labels.len(),
        encoding = %config.encoding,
        "encoded dataset"
    );

    Ok(EncodedDataset {
        schema,
        features,
        targets,
        labels,
    })
}

/// Indicator expansion. Numeric columns come first, in table order, followed
/// by each categorical column's levels in sorted order.
fn one_hot(
    records: &[RawRecord],
    columns: &[&str],
    categorical: &BTreeSet<&str>,
) -> anyhow::Result<(FeatureSchema, Array2<f32>)> {
    let levels = distinct_levels(records, categorical);

    let mut names: Vec<String> = columns
        .iter()
        .filter(|c| !categorical.contains(*c))
        .map(|c| c.to_string())
        .collect();
    for column in columns.iter().filter(|c| categorical.contains(*c)) {
        if let Some(values) = levels.get(column) {
            names.extend(values.iter().map(|v| dummy_column(column, v)));
        }
    }

    let schema = FeatureSchema::new(names).context("building one-hot schema")?;
    let aligner = FeatureAligner::new(schema.clone(), UnknownCategoryPolicy::Reject);
    let (features, _) = aligner.align_batch(records)?.into_parts();
    Ok((schema, features))
}

/// Integer codes in place of each categorical column; column order unchanged.
fn label_encode(
    records: &[RawRecord],
    columns: &[&str],
    categorical: &BTreeSet<&str>,
) -> anyhow::Result<(FeatureSchema, Array2<f32>)> {
    let levels = distinct_levels(records, categorical);
    let schema = FeatureSchema::new(columns.iter().copied()).context("building label schema")?;

    let mut features = Array2::<f32>::zeros((records.len(), columns.len()));
    for (record, mut row) in records.iter().zip(features.rows_mut()) {
        for (j, column) in columns.iter().enumerate() {
            row[j] = match record.get(column) {
                Some(RawValue::Number(n)) => *n as f32,
                Some(RawValue::Text(v)) => levels
                    .get(column)
                    .and_then(|l| l.iter().position(|x| *x == v.as_str()))
                    .map_or(-1.0, |p| p as f32),
                Some(RawValue::Missing) | None => -1.0,
            };
        }
    }
    Ok((schema, features))
}

fn distinct_levels<'a>(
    records: &'a [RawRecord],
    categorical: &BTreeSet<&'a str>,
) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
    let mut levels: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        for (name, value) in record.iter() {
            if let (Some(column), Some(text)) = (categorical.get(name), value.as_text()) {
                levels.entry(*column).or_default().insert(text);
            }
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
age,workclass,education,gender,hours-per-week,income
16,Private,HS-grad,Male,40,<=50K
30,Private,Bachelors,Male,40,>50K
45,State-gov,Masters,Female,50,>50K
52,,HS-grad,Female,,<=50K
80,Private,HS-grad,Male,10,<=50K
38,Self-emp,Bachelors,Female,60,<=50K
";

    fn config(encoding: CategoricalEncoding) -> TrainingConfig {
        let mut config = TrainingConfig::new().with_encoding(encoding);
        config.categorical_columns = vec!["workclass".into(), "gender".into()];
        config
    }

    fn table() -> RawTable {
        RawTable::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn one_hot_pipeline() {
        let data = prepare(table(), &config(CategoricalEncoding::OneHot)).unwrap();

        // 16 and 80 are out of range, the row missing hours-per-week is dropped.
        assert_eq!(data.len(), 3);
        assert_eq!(
            data.schema.columns(),
            &[
                "age",
                "hours-per-week",
                "workclass_Private",
                "workclass_Self-emp",
                "workclass_State-gov",
                "gender_Female",
                "gender_Male",
            ]
        );
        assert_eq!(data.labels, vec!["<=50K", ">50K"]);
        assert_eq!(data.targets, vec![1, 1, 0]);
        assert_eq!(
            data.features.row(0).to_vec(),
            vec![30.0, 40.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        assert!(!data.schema.covers_field("education"));
    }

    #[test]
    fn label_pipeline() {
        let data = prepare(table(), &config(CategoricalEncoding::Label)).unwrap();
        assert_eq!(
            data.schema.columns(),
            &["age", "workclass", "gender", "hours-per-week"]
        );
        // workclass levels: Private, Self-emp, State-gov; gender: Female, Male
        assert_eq!(data.features.row(1).to_vec(), vec![45.0, 2.0, 0.0, 50.0]);
        assert_eq!(data.features.row(2).to_vec(), vec![38.0, 1.0, 0.0, 60.0]);
    }

    #[test]
    fn missing_target_column_fails() {
        let mut config = config(CategoricalEncoding::OneHot);
        config.target_column = "salary".into();
        assert!(prepare(table(), &config).is_err());
    }

    #[test]
    fn subset_selects_rows() {
        let data = prepare(table(), &config(CategoricalEncoding::OneHot)).unwrap();
        let subset = data.subset(&[2, 0]);
        assert_eq!(subset.targets, vec![0, 1]);
        assert_eq!(subset.features.row(1), data.features.row(0));
        assert_eq!(subset.n_classes(), 2);
    }
}
