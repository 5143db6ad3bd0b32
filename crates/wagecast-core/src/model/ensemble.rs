use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use super::Classifier;
use super::tree::DecisionTree;
use crate::error::{Result, WagecastError};

/// Bagged classification trees; predicts the class with the highest mean
/// leaf probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl Classifier for RandomForest {
    fn predict_classes(&self, features: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        features
            .rows()
            .into_iter()
            .map(|row| {
                let mut votes = vec![0f32; self.n_classes];
                for tree in &self.trees {
                    let probs = tree.leaf_value(row)?;
                    for (acc, p) in votes.iter_mut().zip(probs) {
                        *acc += p;
                    }
                }
                Ok(super::argmax(votes))
            })
            .collect()
    }
}

/// Softmax gradient boosting: one regression tree per class per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub n_classes: usize,
    pub learning_rate: f32,
    /// Initial raw score per class (log prior).
    pub init: Vec<f32>,
    /// `[stage][class]`
    pub stages: Vec<Vec<DecisionTree>>,
}

impl GradientBoosting {
    /// Raw additive scores for one row, `[n_classes]`.
    pub fn raw_scores(&self, row: ndarray::ArrayView1<'_, f32>) -> Result<Vec<f32>> {
        let mut scores = self.init.clone();
        for stage in &self.stages {
            if stage.len() != scores.len() {
                return Err(WagecastError::InferenceError(format!(
                    "boosting stage has {} trees for {} classes",
                    stage.len(),
                    scores.len()
                )));
            }
            for (score, tree) in scores.iter_mut().zip(stage) {
                let leaf = tree.leaf_value(row)?;
                *score += self.learning_rate * leaf.first().copied().unwrap_or(0.0);
            }
        }
        Ok(scores)
    }
}

impl Classifier for GradientBoosting {
    fn predict_classes(&self, features: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        features
            .rows()
            .into_iter()
            .map(|row| self.raw_scores(row).map(super::argmax))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::TreeNode;
    use ndarray::array;

    fn stump(threshold: f32, left: Vec<f32>, right: Vec<f32>) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn forest_averages_probabilities() {
        let forest = RandomForest {
            n_classes: 2,
            trees: vec![
                stump(0.0, vec![1.0, 0.0], vec![0.4, 0.6]),
                stump(5.0, vec![0.7, 0.3], vec![0.0, 1.0]),
            ],
        };
        let x = array![[-1.0f32], [1.0], [6.0]];
        // [1.7, 0.3], [1.1, 0.9], [0.4, 1.6]
        assert_eq!(forest.predict_classes(x.view()).unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn boosting_adds_scaled_leaves() {
        let model = GradientBoosting {
            n_classes: 2,
            learning_rate: 0.5,
            init: vec![0.0, 0.25],
            stages: vec![vec![
                stump(0.0, vec![1.0], vec![-1.0]),
                stump(0.0, vec![-1.0], vec![1.0]),
            ]],
        };
        let scores = model.raw_scores(array![-1.0f32].view()).unwrap();
        assert_eq!(scores, vec![0.5, -0.25]);
        let x = array![[-1.0f32], [1.0]];
        assert_eq!(model.predict_classes(x.view()).unwrap(), vec![0, 1]);
    }

    #[test]
    fn boosting_rejects_ragged_stage() {
        let model = GradientBoosting {
            n_classes: 2,
            learning_rate: 0.1,
            init: vec![0.0, 0.0],
            stages: vec![vec![stump(0.0, vec![1.0], vec![-1.0])]],
        };
        assert!(model.raw_scores(array![0.0f32].view()).is_err());
    }
}
