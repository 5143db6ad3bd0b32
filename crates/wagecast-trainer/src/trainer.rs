//! Model selection: fit every registered classifier on the same split and
//! keep the most accurate one.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, bail};
use oorandom::Rand64;
use serde::Serialize;
use tracing::{info, warn};
use wagecast_core::{ModelKind, RawTable, TrainedModel};

use crate::classifiers::{self, TrainingData};
use crate::config::TrainingConfig;
use crate::data::{self, EncodedDataset};
use crate::split::train_test_split;

/// Held-out accuracy of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelScore {
    pub kind: ModelKind,
    pub accuracy: f64,
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Every candidate, in registry order.
    pub scores: Vec<ModelScore>,
    pub best: ModelKind,
    pub best_accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub n_features: usize,
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Reads and encodes the configured dataset.
    pub fn prepare(&self) -> anyhow::Result<EncodedDataset> {
        let table = RawTable::read_csv(&self.config.data_path).with_context(|| {
            format!("reading training data {}", self.config.data_path.display())
        })?;
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            path = %self.config.data_path.display(),
            "loaded training data"
        );
        data::prepare(table, &self.config)
    }

    /// Fits every registered classifier on the training partition and
    /// returns the one with the highest held-out accuracy. Ties keep the
    /// earlier registry entry.
    pub fn select(&self, dataset: &EncodedDataset) -> anyhow::Result<(TrainedModel, TrainingReport)> {
        if dataset.schema.is_empty() {
            bail!("dataset has no feature columns");
        }
        let split = train_test_split(dataset.len(), self.config.test_fraction, self.config.split_seed);
        if split.train.is_empty() || split.test.is_empty() {
            bail!(
                "not enough rows to split ({} rows, test fraction {})",
                dataset.len(),
                self.config.test_fraction
            );
        }
        let train = dataset.subset(&split.train);
        let test = dataset.subset(&split.test);
        info!(train = train.len(), test = test.len(), "split dataset");

        let seed = self.config.model_seed.unwrap_or_else(clock_seed);
        let mut rng = Rand64::new(u128::from(seed));
        let training = TrainingData {
            features: train.features.view(),
            targets: &train.targets,
            n_classes: dataset.n_classes(),
        };

        let mut scores = Vec::new();
        let mut best: Option<(TrainedModel, f64)> = None;
        for (kind, fit) in classifiers::registry() {
            let params = fit(&training, &self.config.hyperparameters, &mut rng)
                .with_context(|| format!("fitting {kind}"))?;
            let model = TrainedModel::new(dataset.labels.clone(), dataset.schema.len(), params);
            let predicted = model.predict_indices(test.features.view())?;
            let accuracy = accuracy(&predicted, &test.targets);
            info!("{kind}: {accuracy:.4}");
            scores.push(ModelScore { kind, accuracy });

            if best.as_ref().is_none_or(|(_, top)| accuracy > *top) {
                best = Some((model, accuracy));
            }
        }

        let Some((model, best_accuracy)) = best else {
            bail!("no classifiers registered");
        };
        info!(model = %model.kind(), accuracy = best_accuracy, "selected model");

        let report = TrainingReport {
            scores,
            best: model.kind(),
            best_accuracy,
            train_rows: train.len(),
            test_rows: test.len(),
            n_features: dataset.schema.len(),
        };
        Ok((model, report))
    }

    /// Writes the model artifact and the feature schema.
    pub fn save(&self, model: &TrainedModel, dataset: &EncodedDataset) -> anyhow::Result<()> {
        for path in [&self.config.model_path, &self.config.columns_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        model
            .save(&self.config.model_path)
            .with_context(|| format!("writing {}", self.config.model_path.display()))?;
        dataset
            .schema
            .save(&self.config.columns_path)
            .with_context(|| format!("writing {}", self.config.columns_path.display()))?;
        info!(
            model = %self.config.model_path.display(),
            columns = %self.config.columns_path.display(),
            "saved artifacts"
        );
        Ok(())
    }

    /// Prepare, select and save.
    pub fn run(&self) -> anyhow::Result<TrainingReport> {
        let dataset = self.prepare()?;
        let (model, report) = self.select(&dataset)?;
        self.save(&model, &dataset)?;
        Ok(report)
    }
}

/// Runs the full pipeline with the given configuration.
pub fn run_training(config: TrainingConfig) -> anyhow::Result<TrainingReport> {
    if !config.data_path.exists() {
        bail!("Training data not found: {}", config.data_path.display());
    }
    Trainer::new(config).run()
}

/// Share of predictions equal to the targets; 0 for empty input.
#[must_use]
pub fn accuracy(predicted: &[usize], targets: &[usize]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    if predicted.len() != targets.len() {
        warn!(predicted = predicted.len(), targets = targets.len(), "length mismatch in accuracy");
    }
    let correct = predicted.iter().zip(targets).filter(|(p, t)| p == t).count();
    correct as f64 / targets.len() as f64
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hyperparameters;
    use wagecast_core::{FeatureSchema, Predictor, RawRecord, UnknownCategoryPolicy};

    /// Older, longer-hours workers earn more; the rest is noise.
    fn write_dataset(path: &std::path::Path) {
        let mut csv = String::from("age,workclass,education,gender,hours-per-week,income\n");
        for i in 0..60 {
            let high = i % 2 == 0;
            let age = if high { 45 + i % 10 } else { 20 + i % 10 };
            let hours = if high { 50 + i % 5 } else { 30 + i % 5 };
            let workclass = ["Private", "Self-emp", "State-gov"][i % 3];
            let gender = if i % 4 < 2 { "Male" } else { "Female" };
            let income = if high { ">50K" } else { "<=50K" };
            csv.push_str(&format!("{age},{workclass},HS-grad,{gender},{hours},{income}\n"));
        }
        std::fs::write(path, csv).unwrap();
    }

    fn config(dir: &std::path::Path) -> TrainingConfig {
        let data = dir.join("adult.csv");
        write_dataset(&data);
        TrainingConfig::new()
            .with_data_path(data)
            .with_model_path(dir.join("out/best_model.json"))
            .with_columns_path(dir.join("out/model_columns.json"))
            .with_model_seed(Some(7))
            .with_hyperparameters(Hyperparameters {
                logistic_max_iter: 200,
                forest_trees: 5,
                svm_max_iter: 200,
                boosting_stages: 10,
                ..Hyperparameters::default()
            })
    }

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn selects_best_and_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let report = run_training(config.clone()).unwrap();

        assert_eq!(report.scores.len(), 5);
        assert_eq!(report.train_rows + report.test_rows, 60);
        assert_eq!(report.test_rows, 12);
        let top = report
            .scores
            .iter()
            .map(|s| s.accuracy)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(report.best_accuracy, top);
        let first_best = report.scores.iter().find(|s| s.accuracy == top).unwrap();
        assert_eq!(report.best, first_best.kind);

        let schema = FeatureSchema::load(&config.columns_path).unwrap();
        assert!(!schema.covers_field("education"));
        assert!(schema.contains("gender_Male"));
        assert_eq!(schema.len(), report.n_features);

        let model = TrainedModel::load(&config.model_path).unwrap();
        assert_eq!(model.kind(), report.best);

        let predictor = Predictor::new(model, schema, UnknownCategoryPolicy::ZeroFill);
        let record = RawRecord::new()
            .with("age", 50)
            .with("workclass", "Private")
            .with("education", "Bachelors")
            .with("gender", "Male")
            .with("hours-per-week", 52);
        let prediction = predictor.predict_record(&record).unwrap();
        assert!(prediction.label == ">50K" || prediction.label == "<=50K");
        assert!(prediction.report.inert_fields.contains("education"));
    }

    #[test]
    fn split_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(config(dir.path()));
        let dataset = trainer.prepare().unwrap();
        let (_, a) = trainer.select(&dataset).unwrap();
        let (_, b) = trainer.select(&dataset).unwrap();
        assert_eq!(a.test_rows, b.test_rows);
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn missing_data_file_fails() {
        let config = TrainingConfig::new().with_data_path("/nonexistent/adult.csv");
        let err = run_training(config).unwrap_err();
        assert!(err.to_string().contains("Training data not found"));
    }
}
