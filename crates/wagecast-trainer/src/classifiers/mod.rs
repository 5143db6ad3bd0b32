//! # Candidate Classifiers
//!
//! One `fit` function per model family. Every family standardizes or
//! partitions the same encoded matrix and returns parameters the core crate
//! knows how to score.

pub mod boosting;
pub mod cart;
pub mod forest;
pub mod knn;
pub mod logistic;
pub mod svm;

use candle_core::{Device, Tensor};
use candle_nn::{Init, Linear, VarBuilder};
use ndarray::{Array2, ArrayView2};
use oorandom::Rand64;
use wagecast_core::ModelKind;
use wagecast_core::model::{LinearModel, ModelParams, Standardizer};

use crate::config::Hyperparameters;

/// Borrowed training partition.
#[derive(Debug, Clone, Copy)]
pub struct TrainingData<'a> {
    pub features: ArrayView2<'a, f32>,
    pub targets: &'a [usize],
    pub n_classes: usize,
}

/// Fits one model family.
pub type FitFn =
    fn(&TrainingData<'_>, &Hyperparameters, &mut Rand64) -> anyhow::Result<ModelParams>;

/// Candidate models in evaluation order. Earlier entries win accuracy ties.
#[must_use]
pub fn registry() -> Vec<(ModelKind, FitFn)> {
    ModelKind::ALL
        .into_iter()
        .map(|kind| {
            let fit: FitFn = match kind {
                ModelKind::LogisticRegression => logistic::fit,
                ModelKind::RandomForest => forest::fit,
                ModelKind::Knn => knn::fit,
                ModelKind::Svm => svm::fit,
                ModelKind::GradientBoosting => boosting::fit,
            };
            (kind, fit)
        })
        .collect()
}

fn to_tensors(
    features: &Array2<f32>,
    targets: &[usize],
    device: &Device,
) -> candle_core::Result<(Tensor, Tensor)> {
    let xs = Tensor::from_vec(
        features.iter().copied().collect::<Vec<f32>>(),
        features.dim(),
        device,
    )?;
    let ys = Tensor::from_vec(
        targets.iter().map(|&t| t as u32).collect::<Vec<u32>>(),
        targets.len(),
        device,
    )?;
    Ok((xs, ys))
}

/// Linear layer with zero-initialized parameters so fits are repeatable.
fn zero_linear(in_dim: usize, out_dim: usize, vb: VarBuilder<'_>) -> candle_core::Result<Linear> {
    let weight = vb.get_with_hints((out_dim, in_dim), "weight", Init::Const(0.0))?;
    let bias = vb.get_with_hints(out_dim, "bias", Init::Const(0.0))?;
    Ok(Linear::new(weight, Some(bias)))
}

fn linear_params(layer: &Linear, n_classes: usize) -> candle_core::Result<(Vec<Vec<f32>>, Vec<f32>)> {
    let weights = layer.weight().to_vec2::<f32>()?;
    let bias = match layer.bias() {
        Some(b) => b.to_vec1::<f32>()?,
        None => vec![0.0; n_classes],
    };
    Ok((weights, bias))
}

fn linear_model(scaler: Standardizer, weights: Vec<Vec<f32>>, bias: Vec<f32>) -> LinearModel {
    LinearModel {
        scaler,
        weights,
        bias,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wagecast_core::TrainedModel;

    /// Class follows the sign of the first feature; the second is noise.
    fn toy() -> (Array2<f32>, Vec<usize>) {
        let n = 40;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                let magnitude = 1.0 + ((i / 2) % 10) as f32;
                if i % 2 == 0 { -magnitude } else { magnitude }
            } else {
                (i % 7) as f32
            }
        });
        let y = (0..n).map(|i| i % 2).collect();
        (x, y)
    }

    fn small() -> Hyperparameters {
        Hyperparameters {
            logistic_max_iter: 300,
            forest_trees: 10,
            svm_max_iter: 300,
            boosting_stages: 20,
            ..Hyperparameters::default()
        }
    }

    fn train_accuracy(kind: ModelKind, fit: FitFn) -> f64 {
        let (x, y) = toy();
        let data = TrainingData {
            features: x.view(),
            targets: &y,
            n_classes: 2,
        };
        let params = fit(&data, &small(), &mut Rand64::new(42)).unwrap();
        assert_eq!(params.kind(), kind);

        let model = TrainedModel::new(vec!["neg".into(), "pos".into()], 2, params);
        let predicted = model.predict_indices(x.view()).unwrap();
        let correct = predicted.iter().zip(&y).filter(|(p, t)| p == t).count();
        correct as f64 / y.len() as f64
    }

    #[test]
    fn registry_order() {
        let kinds: Vec<ModelKind> = registry().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, ModelKind::ALL.to_vec());
    }

    #[test]
    fn every_family_learns_a_separable_problem() {
        for (kind, fit) in registry() {
            let accuracy = train_accuracy(kind, fit);
            assert!(accuracy >= 0.95, "{kind}: accuracy {accuracy}");
        }
    }

    #[test]
    fn linear_fits_are_repeatable() {
        let (x, y) = toy();
        let data = TrainingData {
            features: x.view(),
            targets: &y,
            n_classes: 2,
        };
        let predict = |seed| {
            let params = logistic::fit(&data, &small(), &mut Rand64::new(seed)).unwrap();
            TrainedModel::new(vec!["neg".into(), "pos".into()], 2, params)
                .predict_indices(x.view())
                .unwrap()
        };
        assert_eq!(predict(1), predict(2));
    }

    #[test]
    fn knn_rejects_zero_neighbors() {
        let (x, y) = toy();
        let data = TrainingData {
            features: x.view(),
            targets: &y,
            n_classes: 2,
        };
        let params = Hyperparameters {
            knn_neighbors: 0,
            ..Hyperparameters::default()
        };
        assert!(knn::fit(&data, &params, &mut Rand64::new(1)).is_err());
    }
}
