//! Linear decision functions shared by logistic regression and the linear SVM.

use candle_core::{Device, Tensor};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::Classifier;
use super::scale::Standardizer;
use crate::error::{Result, WagecastError};

/// One weight vector and bias per class over standardized features.
///
/// Prediction is the class with the highest score, which covers both the
/// softmax regression and one-vs-rest hinge models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub scaler: Standardizer,
    /// `[n_classes][n_features]`
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LinearModel {
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.bias.len()
    }

    /// Raw class scores, `[n_rows, n_classes]`.
    pub fn decision_function(&self, features: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        let scaled = self.scaler.transform(features);
        let (n, d) = scaled.dim();
        let c = self.n_classes();
        if n == 0 || d == 0 {
            return Ok(Array2::from_shape_fn((n, c), |(_, j)| self.bias[j]));
        }

        let device = Device::Cpu;
        let xs = Tensor::from_vec(scaled.iter().copied().collect::<Vec<f32>>(), (n, d), &device)?;
        let w = Tensor::from_vec(
            self.weights.iter().flatten().copied().collect::<Vec<f32>>(),
            (c, d),
            &device,
        )?;
        let b = Tensor::from_vec(self.bias.clone(), c, &device)?;

        let scores = xs.matmul(&w.t()?)?.broadcast_add(&b)?;
        let flat: Vec<f32> = scores.flatten_all()?.to_vec1()?;
        Array2::from_shape_vec((n, c), flat)
            .map_err(|e| WagecastError::InferenceError(e.to_string()))
    }
}

impl Classifier for LinearModel {
    fn predict_classes(&self, features: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        let scores = self.decision_function(features)?;
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| super::argmax(row.iter().copied()))
            .collect())
    }
}
