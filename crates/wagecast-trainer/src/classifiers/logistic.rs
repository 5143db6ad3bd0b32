//! Multinomial logistic regression, fitted with AdamW on the full batch.

use candle_core::{DType, Device};
use candle_nn::{AdamW, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap, loss};
use oorandom::Rand64;
use tracing::debug;
use wagecast_core::model::{ModelParams, Standardizer};

use super::{TrainingData, linear_model, linear_params, to_tensors, zero_linear};
use crate::config::Hyperparameters;

pub fn fit(
    data: &TrainingData<'_>,
    params: &Hyperparameters,
    _rng: &mut Rand64,
) -> anyhow::Result<ModelParams> {
    let device = Device::Cpu;
    let scaler = Standardizer::fit(data.features);
    let (xs, ys) = to_tensors(&scaler.transform(data.features), data.targets, &device)?;

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let layer = zero_linear(data.features.ncols(), data.n_classes, vb.pp("logistic"))?;
    let mut opt = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: params.logistic_learning_rate,
            ..Default::default()
        },
    )?;

    let mut previous = f32::INFINITY;
    for step in 0..params.logistic_max_iter {
        let logits = layer.forward(&xs)?;
        let loss = loss::cross_entropy(&logits, &ys)?;
        opt.backward_step(&loss)?;

        let current = loss.to_scalar::<f32>()?;
        if (previous - current).abs() < params.logistic_tolerance {
            debug!(step, loss = current, "logistic regression converged");
            break;
        }
        previous = current;
    }

    let (weights, bias) = linear_params(&layer, data.n_classes)?;
    Ok(ModelParams::LogisticRegression(linear_model(scaler, weights, bias)))
}
