//! Training pipeline configuration.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How categorical columns are turned into numbers before fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalEncoding {
    /// `<column>_<value>` indicator columns, the same expansion the
    /// inference adapter applies.
    #[default]
    OneHot,
    /// One integer code per distinct value, assigned in sorted order.
    Label,
}

impl FromStr for CategoricalEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-hot" | "onehot" => Ok(Self::OneHot),
            "label" => Ok(Self::Label),
            other => Err(format!("unknown encoding {other:?} (expected one-hot or label)")),
        }
    }
}

impl fmt::Display for CategoricalEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneHot => write!(f, "one-hot"),
            Self::Label => write!(f, "label"),
        }
    }
}

/// Default hyperparameters for each classifier in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub logistic_max_iter: usize,
    pub logistic_learning_rate: f64,
    pub logistic_tolerance: f32,

    pub forest_trees: usize,
    pub forest_max_depth: Option<usize>,
    pub forest_min_samples_split: usize,

    pub knn_neighbors: usize,

    pub svm_max_iter: usize,
    pub svm_learning_rate: f64,
    pub svm_alpha: f64,

    pub boosting_stages: usize,
    pub boosting_learning_rate: f32,
    pub boosting_max_depth: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            logistic_max_iter: 1000,
            logistic_learning_rate: 0.05,
            logistic_tolerance: 1e-6,

            forest_trees: 100,
            forest_max_depth: None,
            forest_min_samples_split: 2,

            knn_neighbors: 5,

            svm_max_iter: 1000,
            svm_learning_rate: 0.1,
            svm_alpha: 1e-4,

            boosting_stages: 100,
            boosting_learning_rate: 0.1,
            boosting_max_depth: 3,
        }
    }
}

/// Configuration for a training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Labeled dataset (CSV with header)
    pub data_path: PathBuf,
    /// Where the selected model is written
    pub model_path: PathBuf,
    /// Where the feature schema is written
    pub columns_path: PathBuf,
    /// Label column
    pub target_column: String,
    /// Column used for the row filter
    pub age_column: String,
    /// Rows outside this range are discarded
    pub age_range: RangeInclusive<f64>,
    /// Columns removed before encoding
    pub drop_columns: Vec<String>,
    /// Columns encoded as categorical
    pub categorical_columns: Vec<String>,
    pub encoding: CategoricalEncoding,
    /// Held-out share of rows, in `(0, 1)`
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
    /// Seed for model-internal randomness; drawn from the clock when unset
    pub model_seed: Option<u64>,
    pub hyperparameters: Hyperparameters,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("adult.csv"),
            model_path: PathBuf::from("best_model.json"),
            columns_path: PathBuf::from("model_columns.json"),
            target_column: "income".into(),
            age_column: "age".into(),
            age_range: 17.0..=75.0,
            drop_columns: vec!["education".into()],
            categorical_columns: [
                "workclass",
                "marital-status",
                "occupation",
                "relationship",
                "race",
                "gender",
                "native-country",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            encoding: CategoricalEncoding::OneHot,
            test_fraction: 0.2,
            split_seed: 42,
            model_seed: None,
            hyperparameters: Hyperparameters::default(),
        }
    }
}

impl TrainingConfig {
    /// Create a new training configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_columns_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.columns_path = path.into();
        self
    }

    pub fn with_encoding(mut self, encoding: CategoricalEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the held-out share, clamped to `[0.01, 0.99]`.
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction.clamp(0.01, 0.99);
        self
    }

    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    pub fn with_model_seed(mut self, seed: Option<u64>) -> Self {
        self.model_seed = seed;
        self
    }

    pub fn with_hyperparameters(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }
}
