use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WagecastError};

/// A node of a flattened binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    /// Rows with `row[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    /// Class probabilities for classification trees, a single value for
    /// regression trees.
    Leaf { value: Vec<f32> },
}

/// Decision tree stored as a node arena; the root is node 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Follows splits from the root to a leaf and returns its value.
    ///
    /// # Errors
    ///
    /// Returns `WagecastError::InferenceError` for a malformed tree: dangling
    /// child indices, a split on a feature outside the row, or a cycle.
    pub fn leaf_value(&self, row: ArrayView1<'_, f32>) -> Result<&[f32]> {
        let mut index = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).ok_or_else(|| {
                        WagecastError::InferenceError(format!(
                            "tree splits on feature {feature}, row has {}",
                            row.len()
                        ))
                    })?;
                    index = if x <= threshold { *left } else { *right };
                }
                None => {
                    return Err(WagecastError::InferenceError(format!(
                        "tree node {index} does not exist"
                    )));
                }
            }
        }
        Err(WagecastError::InferenceError("tree contains a cycle".into()))
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }
}
