//! Linear one-vs-rest SVM: hinge loss plus an L2 penalty, minimized by
//! full-batch subgradient descent.

use candle_core::{DType, Device, Tensor};
use candle_nn::{Module, Optimizer, SGD, VarBuilder, VarMap};
use oorandom::Rand64;
use tracing::debug;
use wagecast_core::model::{ModelParams, Standardizer};

use super::{TrainingData, linear_model, linear_params, zero_linear};
use crate::config::Hyperparameters;

pub fn fit(
    data: &TrainingData<'_>,
    params: &Hyperparameters,
    _rng: &mut Rand64,
) -> anyhow::Result<ModelParams> {
    let device = Device::Cpu;
    let (n, d) = data.features.dim();
    let k = data.n_classes;
    let scaler = Standardizer::fit(data.features);
    let scaled = scaler.transform(data.features);
    let xs = Tensor::from_vec(scaled.iter().copied().collect::<Vec<f32>>(), (n, d), &device)?;

    // +1 for the row's class, -1 elsewhere.
    let signs: Vec<f32> = data
        .targets
        .iter()
        .flat_map(|&t| (0..k).map(move |c| if c == t { 1.0 } else { -1.0 }))
        .collect();
    let ys = Tensor::from_vec(signs, (n, k), &device)?;

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let layer = zero_linear(d, k, vb.pp("svm"))?;
    let mut opt = SGD::new(varmap.all_vars(), params.svm_learning_rate)?;

    for step in 0..params.svm_max_iter {
        let scores = layer.forward(&xs)?;
        let hinge = scores.mul(&ys)?.affine(-1.0, 1.0)?.relu()?.sum(1)?.mean(0)?;
        let penalty = layer.weight().sqr()?.sum_all()?.affine(params.svm_alpha, 0.0)?;
        let loss = hinge.add(&penalty)?;
        opt.backward_step(&loss)?;
        if (step + 1) % 250 == 0 {
            debug!(step = step + 1, loss = loss.to_scalar::<f32>()?, "svm progress");
        }
    }

    let (weights, bias) = linear_params(&layer, k)?;
    Ok(ModelParams::Svm(linear_model(scaler, weights, bias)))
}
