//! # Trained Models
//!
//! The serialized classifier artifact and its inference path.
//!
//! A [`TrainedModel`] is immutable once loaded. It knows its class labels and
//! the feature width it was fitted on; every prediction validates the input
//! against that width before any scoring happens.

pub mod ensemble;
pub mod knn;
pub mod linear;
pub mod scale;
pub mod tree;

use std::fmt;
use std::path::Path;

use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WagecastError};

pub use ensemble::{GradientBoosting, RandomForest};
pub use knn::KNearest;
pub use linear::LinearModel;
pub use scale::Standardizer;
pub use tree::{DecisionTree, TreeNode};

/// Anything that maps validated feature rows to class indices.
pub trait Classifier {
    /// Class index for every row. `features` has already been checked for
    /// width and finiteness.
    fn predict_classes(&self, features: ArrayView2<'_, f32>) -> Result<Vec<usize>>;
}

/// The five classifier families the trainer chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    LogisticRegression,
    RandomForest,
    Knn,
    Svm,
    GradientBoosting,
}

impl ModelKind {
    /// All kinds, in trainer registry order.
    pub const ALL: [ModelKind; 5] = [
        Self::LogisticRegression,
        Self::RandomForest,
        Self::Knn,
        Self::Svm,
        Self::GradientBoosting,
    ];
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogisticRegression => write!(f, "LogisticRegression"),
            Self::RandomForest => write!(f, "RandomForest"),
            Self::Knn => write!(f, "KNN"),
            Self::Svm => write!(f, "SVM"),
            Self::GradientBoosting => write!(f, "GradientBoosting"),
        }
    }
}

/// Fitted parameters, tagged by model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ModelParams {
    LogisticRegression(LinearModel),
    RandomForest(RandomForest),
    Knn(KNearest),
    Svm(LinearModel),
    GradientBoosting(GradientBoosting),
}

impl ModelParams {
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::LogisticRegression(_) => ModelKind::LogisticRegression,
            Self::RandomForest(_) => ModelKind::RandomForest,
            Self::Knn(_) => ModelKind::Knn,
            Self::Svm(_) => ModelKind::Svm,
            Self::GradientBoosting(_) => ModelKind::GradientBoosting,
        }
    }

    fn classifier(&self) -> &dyn Classifier {
        match self {
            Self::LogisticRegression(m) | Self::Svm(m) => m,
            Self::RandomForest(m) => m,
            Self::Knn(m) => m,
            Self::GradientBoosting(m) => m,
        }
    }
}

/// A fitted classifier plus what it needs to turn class indices into labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    /// Class labels, indexed by class.
    pub labels: Vec<String>,
    /// Width of the feature vectors the model was fitted on.
    pub n_features: usize,
    pub params: ModelParams,
}

impl TrainedModel {
    #[must_use]
    pub fn new(labels: Vec<String>, n_features: usize, params: ModelParams) -> Self {
        Self {
            labels,
            n_features,
            params,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.params.kind()
    }

    /// Loads a model artifact written by [`TrainedModel::save`].
    ///
    /// No version or compatibility check is performed; a model that does not
    /// match the schema fails at its first prediction.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WagecastError::ModelLoadError(format!("{}: {e}", path.display()))
        })?;
        let model: Self = serde_json::from_str(&content).map_err(|e| {
            WagecastError::ModelLoadError(format!("{}: {e}", path.display()))
        })?;
        tracing::info!(
            kind = %model.kind(),
            classes = model.labels.len(),
            features = model.n_features,
            path = %path.display(),
            "loaded model"
        );
        Ok(model)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Class indices for every row.
    ///
    /// # Errors
    ///
    /// `WagecastError::FeatureMismatch` if the width differs from
    /// `n_features`, `WagecastError::InvalidInput` for non-finite values.
    pub fn predict_indices(&self, features: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        if features.ncols() != self.n_features {
            return Err(WagecastError::FeatureMismatch {
                expected: self.n_features,
                found: features.ncols(),
            });
        }
        if let Some(((row, col), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(WagecastError::InvalidInput(format!(
                "non-finite value at row {row}, column {col}"
            )));
        }
        self.params.classifier().predict_classes(features)
    }

    /// One label per row, in row order.
    pub fn predict(&self, features: ArrayView2<'_, f32>) -> Result<Vec<String>> {
        self.predict_indices(features)?
            .into_iter()
            .map(|class| {
                self.labels.get(class).cloned().ok_or_else(|| {
                    WagecastError::InferenceError(format!(
                        "class {class} has no label ({} labels)",
                        self.labels.len()
                    ))
                })
            })
            .collect()
    }

    /// Label for a single encoded vector.
    pub fn predict_one(&self, features: ArrayView1<'_, f32>) -> Result<String> {
        let labels = self.predict(features.insert_axis(Axis(0)))?;
        labels
            .into_iter()
            .next()
            .ok_or_else(|| WagecastError::InferenceError("no prediction produced".into()))
    }
}

/// Index of the first maximum; 0 for an empty input.
pub fn argmax<I: IntoIterator<Item = f32>>(values: I) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, v) in values.into_iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn linear_model() -> TrainedModel {
        TrainedModel::new(
            vec!["<=50K".into(), ">50K".into()],
            2,
            ModelParams::LogisticRegression(LinearModel {
                scaler: Standardizer {
                    mean: vec![0.0, 0.0],
                    scale: vec![1.0, 1.0],
                },
                weights: vec![vec![-1.0, 0.0], vec![1.0, 0.0]],
                bias: vec![0.0, 0.0],
            }),
        )
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(vec![0.1, 0.7, 0.7]), 1);
        assert_eq!(argmax(Vec::<f32>::new()), 0);
    }

    #[test]
    fn kind_names() {
        let names: Vec<String> = ModelKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec!["LogisticRegression", "RandomForest", "KNN", "SVM", "GradientBoosting"]
        );
    }

    #[test]
    fn predicts_labels_in_order() {
        let model = linear_model();
        let x = array![[1.0f32, 0.0], [-1.0, 0.0], [2.0, 5.0]];
        assert_eq!(model.predict(x.view()).unwrap(), vec![">50K", "<=50K", ">50K"]);
        assert_eq!(model.predict_one(x.row(1)).unwrap(), "<=50K");
        assert_eq!(model.kind(), ModelKind::LogisticRegression);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let model = linear_model();
        let x = array![[1.0f32, 0.0, 3.0]];
        let err = model.predict(x.view()).unwrap_err();
        assert!(matches!(
            err,
            WagecastError::FeatureMismatch {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let model = linear_model();
        let x = array![[1.0f32, 0.0], [f32::NAN, 0.0]];
        let err = model.predict(x.view()).unwrap_err();
        assert!(err.to_string().contains("row 1, column 0"));
    }

    #[test]
    fn artifact_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.json");
        let model = linear_model();
        model.save(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains(r#""kind":"LogisticRegression""#));

        let back = TrainedModel::load(&path).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn corrupt_artifact_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            TrainedModel::load(&path).unwrap_err(),
            WagecastError::ModelLoadError(_)
        ));
    }
}
