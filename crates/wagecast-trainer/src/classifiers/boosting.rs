//! Multinomial gradient boosting.
//!
//! Each stage fits one depth-limited regression tree per class to the
//! softmax residuals `y - p`, with Newton-step leaf values.

use ndarray::{Array2, Axis};
use oorandom::Rand64;
use tracing::debug;
use wagecast_core::model::{GradientBoosting, ModelParams};

use super::TrainingData;
use super::cart::{self, SoftmaxResidual, TreeParams};
use crate::config::Hyperparameters;

pub fn fit(
    data: &TrainingData<'_>,
    params: &Hyperparameters,
    rng: &mut Rand64,
) -> anyhow::Result<ModelParams> {
    let n = data.features.nrows();
    let k = data.n_classes;
    let lr = params.boosting_learning_rate;
    let tree_params = TreeParams {
        max_depth: Some(params.boosting_max_depth),
        ..TreeParams::default()
    };

    let init = log_priors(data.targets, k);
    let mut raw = Array2::from_shape_fn((n, k), |(_, c)| init[c]);
    let mut stages = Vec::with_capacity(params.boosting_stages);

    for stage in 0..params.boosting_stages {
        let probs = softmax_rows(&raw);
        let mut trees = Vec::with_capacity(k);
        for class in 0..k {
            let residuals: Vec<f32> = probs
                .column(class)
                .iter()
                .zip(data.targets)
                .map(|(&p, &t)| if t == class { 1.0 - p } else { -p })
                .collect();
            let objective = SoftmaxResidual {
                residuals: &residuals,
                n_classes: k,
            };
            let tree = cart::grow(data.features, (0..n).collect(), &objective, &tree_params, rng);
            for (i, row) in data.features.rows().into_iter().enumerate() {
                let step = tree.leaf_value(row)?.first().copied().unwrap_or(0.0);
                raw[[i, class]] += lr * step;
            }
            trees.push(tree);
        }
        stages.push(trees);
        if (stage + 1) % 25 == 0 {
            debug!(stages = stage + 1, "boosting progress");
        }
    }

    Ok(ModelParams::GradientBoosting(GradientBoosting {
        n_classes: k,
        learning_rate: lr,
        init,
        stages,
    }))
}

fn log_priors(targets: &[usize], n_classes: usize) -> Vec<f32> {
    let mut counts = vec![0f64; n_classes];
    for &t in targets {
        if let Some(c) = counts.get_mut(t) {
            *c += 1.0;
        }
    }
    let total = targets.len().max(1) as f64;
    counts
        .iter()
        .map(|&c| (c / total).max(1e-12).ln() as f32)
        .collect()
}

fn softmax_rows(raw: &Array2<f32>) -> Array2<f32> {
    let mut probs = raw.clone();
    for mut row in probs.axis_iter_mut(Axis(0)) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum: f32 = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    probs
}
