//! k-nearest neighbors: the fit is just the standardized training set.

use oorandom::Rand64;
use wagecast_core::model::{KNearest, ModelParams, Standardizer};

use super::TrainingData;
use crate::config::Hyperparameters;

pub fn fit(
    data: &TrainingData<'_>,
    params: &Hyperparameters,
    _rng: &mut Rand64,
) -> anyhow::Result<ModelParams> {
    if params.knn_neighbors == 0 {
        anyhow::bail!("knn_neighbors must be at least 1");
    }
    let scaler = Standardizer::fit(data.features);
    let points = scaler
        .transform(data.features)
        .rows()
        .into_iter()
        .map(|row| row.to_vec())
        .collect();

    Ok(ModelParams::Knn(KNearest {
        k: params.knn_neighbors,
        n_classes: data.n_classes,
        scaler,
        points,
        targets: data.targets.to_vec(),
    }))
}
