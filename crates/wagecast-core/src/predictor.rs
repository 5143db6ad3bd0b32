//! # Predictor
//!
//! Loads the model artifact and feature schema once, then aligns and scores
//! raw records on request.

use std::path::PathBuf;

use tracing::info;

use crate::align::{AlignmentReport, FeatureAligner, UnknownCategoryPolicy};
use crate::error::Result;
use crate::model::TrainedModel;
use crate::table::RawTable;
use crate::types::{FeatureSchema, RawRecord, RawValue};

/// Column appended to bulk prediction output.
pub const BULK_PREDICTION_COLUMN: &str = "Prediction";

/// Column appended to a single-record result.
pub const SINGLE_PREDICTION_COLUMN: &str = "prediction";

/// Configuration for the predictor.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Serialized model artifact
    pub model_path: PathBuf,
    /// Feature schema (JSON array of column names)
    pub schema_path: PathBuf,
    /// What alignment does with unseen categorical levels
    pub unknown_policy: UnknownCategoryPolicy,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("best_model.json"),
            schema_path: PathBuf::from("model_columns.json"),
            unknown_policy: UnknownCategoryPolicy::ZeroFill,
        }
    }
}

impl PredictorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = path.into();
        self
    }

    pub fn with_unknown_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }
}

/// Outcome of predicting a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub report: AlignmentReport,
}

impl Prediction {
    /// The record plus its prediction as a one-row table, ready to be written
    /// out as the single-result file. A `prediction` field already on the
    /// record is overwritten.
    pub fn to_table(&self, record: &RawRecord) -> Result<RawTable> {
        let mut table = RawTable::from_records(std::slice::from_ref(record));
        table.set_column(
            SINGLE_PREDICTION_COLUMN,
            vec![RawValue::Text(self.label.clone())],
        )?;
        Ok(table)
    }
}

/// Outcome of predicting a batch: one label per input row, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    pub labels: Vec<String>,
    pub report: AlignmentReport,
}

/// Read-only pairing of a trained model with the schema it was fitted on.
pub struct Predictor {
    model: TrainedModel,
    aligner: FeatureAligner,
}

impl Predictor {
    /// Assembles a predictor from already-loaded parts.
    pub fn new(model: TrainedModel, schema: FeatureSchema, policy: UnknownCategoryPolicy) -> Self {
        Self {
            model,
            aligner: FeatureAligner::new(schema, policy),
        }
    }

    /// Loads both artifacts.
    ///
    /// # Errors
    ///
    /// Returns `WagecastError::ModelLoadError` if either file is missing or
    /// corrupt. There is no fallback.
    pub fn load(config: &PredictorConfig) -> Result<Self> {
        let model = TrainedModel::load(&config.model_path)?;
        let schema = FeatureSchema::load(&config.schema_path)?;
        info!(
            model = %model.kind(),
            columns = schema.len(),
            policy = %config.unknown_policy,
            "predictor ready"
        );
        Ok(Self::new(model, schema, config.unknown_policy))
    }

    #[must_use]
    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        self.aligner.schema()
    }

    /// Aligns and predicts one record.
    pub fn predict_record(&self, record: &RawRecord) -> Result<Prediction> {
        let alignment = self.aligner.align(record)?;
        let label = self.model.predict_one(alignment.row(0))?;
        let (_, report) = alignment.into_parts();
        Ok(Prediction { label, report })
    }

    /// Aligns and predicts a batch, one label per record.
    pub fn predict_records(&self, records: &[RawRecord]) -> Result<BatchPrediction> {
        let alignment = self.aligner.align_batch(records)?;
        let labels = self.model.predict(alignment.matrix().view())?;
        let (_, report) = alignment.into_parts();
        Ok(BatchPrediction { labels, report })
    }

    /// Predicts every row of an uploaded table and returns a copy of the
    /// table with a `Prediction` column appended, or replaced if the table
    /// already has one.
    pub fn predict_table(&self, table: &RawTable) -> Result<(RawTable, AlignmentReport)> {
        let batch = self.predict_records(table.rows())?;
        let mut output = table.clone();
        output.set_column(
            BULK_PREDICTION_COLUMN,
            batch.labels.into_iter().map(RawValue::Text).collect(),
        )?;
        info!(rows = output.len(), unknown = batch.report.unknown_count(), "bulk prediction complete");
        Ok((output, batch.report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WagecastError;
    use crate::model::{LinearModel, ModelParams, Standardizer};

    /// Predicts ">50K" when `age` dominates and `gender_Male` is set.
    fn predictor(policy: UnknownCategoryPolicy) -> Predictor {
        let schema =
            FeatureSchema::new(["age", "gender_Male", "gender_Female", "workclass_Private"])
                .unwrap();
        let model = TrainedModel::new(
            vec!["<=50K".into(), ">50K".into()],
            4,
            ModelParams::LogisticRegression(LinearModel {
                scaler: Standardizer {
                    mean: vec![0.0; 4],
                    scale: vec![1.0; 4],
                },
                weights: vec![vec![0.0; 4], vec![0.1, 1.0, 0.0, 0.0]],
                bias: vec![0.0, -4.5],
            }),
        );
        Predictor::new(model, schema, policy)
    }

    #[test]
    fn single_record() {
        let p = predictor(UnknownCategoryPolicy::ZeroFill);
        let record = RawRecord::new()
            .with("age", 40)
            .with("gender", "Male")
            .with("workclass", "Private");
        let prediction = p.predict_record(&record).unwrap();
        assert_eq!(prediction.label, ">50K");
        assert!(prediction.report.is_clean());

        let table = prediction.to_table(&record).unwrap();
        assert_eq!(
            table.to_csv_string().unwrap(),
            "age,gender,workclass,prediction\n40,Male,Private,>50K\n"
        );
    }

    #[test]
    fn bulk_table_with_missing_field() {
        let p = predictor(UnknownCategoryPolicy::ZeroFill);
        let input = RawTable::from_reader(
            "age,gender,workclass\n40,Male,Private\n40,,Private\n20,Female,Government\n"
                .as_bytes(),
        )
        .unwrap();
        let (output, report) = p.predict_table(&input).unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output.columns().last().map(String::as_str), Some("Prediction"));
        let labels: Vec<String> = output
            .column("Prediction")
            .unwrap()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, vec![">50K", "<=50K", "<=50K"]);
        assert_eq!(report.unknown_count(), 1);
    }

    #[test]
    fn existing_prediction_columns_are_overwritten() {
        let p = predictor(UnknownCategoryPolicy::ZeroFill);
        let input =
            RawTable::from_reader("age,gender,Prediction\n40,Male,<=50K\n".as_bytes()).unwrap();
        let (output, _) = p.predict_table(&input).unwrap();
        assert_eq!(
            output.to_csv_string().unwrap(),
            "age,gender,Prediction\n40,Male,>50K\n"
        );

        let record = RawRecord::new()
            .with("age", 40)
            .with("gender", "Male")
            .with("prediction", "<=50K");
        let prediction = p.predict_record(&record).unwrap();
        assert_eq!(
            prediction.to_table(&record).unwrap().to_csv_string().unwrap(),
            "age,gender,prediction\n40,Male,>50K\n"
        );
    }

    #[test]
    fn duplicate_headers_keep_first_value() {
        let p = predictor(UnknownCategoryPolicy::ZeroFill);
        let input = RawTable::from_reader("age,gender,age\n40,Male,10\n".as_bytes()).unwrap();
        let (output, report) = p.predict_table(&input).unwrap();
        assert_eq!(
            output.to_csv_string().unwrap(),
            "age,gender,age.1,Prediction\n40,Male,10,>50K\n"
        );
        assert!(report.inert_fields.contains("age.1"));
    }

    #[test]
    fn reject_policy_fails_request() {
        let p = predictor(UnknownCategoryPolicy::Reject);
        let record = RawRecord::new().with("age", 40).with("workclass", "Government");
        assert!(matches!(
            p.predict_record(&record),
            Err(WagecastError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn missing_numeric_cell_is_fatal() {
        let p = predictor(UnknownCategoryPolicy::ZeroFill);
        let input = RawTable::from_reader("age,gender\n40,Male\n,Female\n".as_bytes()).unwrap();
        assert!(matches!(
            p.predict_table(&input),
            Err(WagecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn schema_model_mismatch_fails_at_prediction() {
        let schema = FeatureSchema::new(["age", "gender_Male"]).unwrap();
        let p = Predictor::new(predictor(UnknownCategoryPolicy::ZeroFill).model, schema, UnknownCategoryPolicy::ZeroFill);
        let record = RawRecord::new().with("age", 40);
        assert!(matches!(
            p.predict_record(&record),
            Err(WagecastError::FeatureMismatch { expected: 4, found: 2 })
        ));
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let p = predictor(UnknownCategoryPolicy::ZeroFill);
        let config = PredictorConfig::new()
            .with_model_path(dir.path().join("best_model.json"))
            .with_schema_path(dir.path().join("model_columns.json"));
        p.model().save(&config.model_path).unwrap();
        p.schema().save(&config.schema_path).unwrap();

        let loaded = Predictor::load(&config).unwrap();
        assert_eq!(loaded.schema().len(), 4);
        assert_eq!(loaded.model(), p.model());
    }

    #[test]
    fn missing_artifacts_are_fatal() {
        let config = PredictorConfig::new().with_model_path("/nonexistent/best_model.json");
        assert!(matches!(
            Predictor::load(&config),
            Err(WagecastError::ModelLoadError(_))
        ));
    }
}
