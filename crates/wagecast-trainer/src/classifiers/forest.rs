//! Bagged Gini trees with `sqrt(d)` features per split.

use oorandom::Rand64;
use tracing::debug;
use wagecast_core::model::{ModelParams, RandomForest};

use super::TrainingData;
use super::cart::{self, Gini, TreeParams};
use crate::config::Hyperparameters;

pub fn fit(
    data: &TrainingData<'_>,
    params: &Hyperparameters,
    rng: &mut Rand64,
) -> anyhow::Result<ModelParams> {
    let n = data.features.nrows();
    let max_features = ((data.features.ncols() as f64).sqrt().floor() as usize).max(1);
    let tree_params = TreeParams {
        max_depth: params.forest_max_depth,
        min_samples_split: params.forest_min_samples_split,
        max_features: Some(max_features),
        ..TreeParams::default()
    };
    let objective = Gini {
        targets: data.targets,
        n_classes: data.n_classes,
    };

    let mut trees = Vec::with_capacity(params.forest_trees);
    for t in 0..params.forest_trees {
        let bootstrap: Vec<usize> = (0..n)
            .map(|_| rng.rand_range(0..n as u64) as usize)
            .collect();
        let tree = cart::grow(data.features, bootstrap, &objective, &tree_params, rng);
        if (t + 1) % 25 == 0 {
            debug!(trees = t + 1, leaves = tree.leaf_count(), "forest progress");
        }
        trees.push(tree);
    }

    Ok(ModelParams::RandomForest(RandomForest {
        n_classes: data.n_classes,
        trees,
    }))
}
