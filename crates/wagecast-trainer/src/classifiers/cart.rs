//! CART tree growing shared by the forest and the boosting stages.
//!
//! Splits are found by sorting each candidate feature and scanning prefix
//! statistics, so every node costs `O(features * n log n)`.

use ndarray::ArrayView2;
use oorandom::Rand64;
use wagecast_core::model::{DecisionTree, TreeNode};

/// What a tree minimizes and what its leaves hold.
pub trait Objective {
    /// Length of the per-node statistics vector.
    fn stats_len(&self) -> usize;

    /// Adds one sample's contribution to `stats`.
    fn accumulate(&self, sample: usize, stats: &mut [f64]);

    /// Total (count-weighted) impurity of a node with these statistics.
    fn impurity(&self, stats: &[f64], count: usize) -> f64;

    /// Leaf payload for the samples that reached it.
    fn leaf(&self, samples: &[usize]) -> Vec<f32>;
}

/// Gini impurity over class targets; leaves hold class frequencies.
pub struct Gini<'a> {
    pub targets: &'a [usize],
    pub n_classes: usize,
}

impl Objective for Gini<'_> {
    fn stats_len(&self) -> usize {
        self.n_classes
    }

    fn accumulate(&self, sample: usize, stats: &mut [f64]) {
        if let Some(slot) = stats.get_mut(self.targets[sample]) {
            *slot += 1.0;
        }
    }

    fn impurity(&self, stats: &[f64], count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let n = count as f64;
        n - stats.iter().map(|c| c * c).sum::<f64>() / n
    }

    fn leaf(&self, samples: &[usize]) -> Vec<f32> {
        let mut counts = vec![0f32; self.n_classes];
        for &s in samples {
            if let Some(c) = counts.get_mut(self.targets[s]) {
                *c += 1.0;
            }
        }
        let total = samples.len().max(1) as f32;
        counts.iter_mut().for_each(|c| *c /= total);
        counts
    }
}

/// Squared error on softmax residuals, with a one-step Newton leaf value.
pub struct SoftmaxResidual<'a> {
    pub residuals: &'a [f32],
    pub n_classes: usize,
}

impl Objective for SoftmaxResidual<'_> {
    fn stats_len(&self) -> usize {
        2
    }

    fn accumulate(&self, sample: usize, stats: &mut [f64]) {
        let r = f64::from(self.residuals[sample]);
        stats[0] += r;
        stats[1] += r * r;
    }

    fn impurity(&self, stats: &[f64], count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        stats[1] - stats[0] * stats[0] / count as f64
    }

    fn leaf(&self, samples: &[usize]) -> Vec<f32> {
        let (numerator, denominator) = samples.iter().fold((0f64, 0f64), |(num, den), &s| {
            let r = f64::from(self.residuals[s]);
            (num + r, den + r.abs() * (1.0 - r.abs()))
        });
        let k = self.n_classes as f64;
        let gamma = if denominator.abs() < 1e-12 {
            0.0
        } else {
            (k - 1.0) / k * numerator / denominator
        };
        vec![gamma as f32]
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; all of them when `None`.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

struct Candidate {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

/// Grows a tree on `samples` (row indices into `features`, repeats allowed).
pub fn grow<O: Objective>(
    features: ArrayView2<'_, f32>,
    samples: Vec<usize>,
    objective: &O,
    params: &TreeParams,
    rng: &mut Rand64,
) -> DecisionTree {
    let placeholder = || TreeNode::Leaf { value: Vec::new() };
    let mut nodes = vec![placeholder()];
    let mut stack = vec![(0usize, samples, 0usize)];

    while let Some((index, samples, depth)) = stack.pop() {
        let splittable = samples.len() >= params.min_samples_split.max(2)
            && params.max_depth.is_none_or(|max| depth < max);
        let split = if splittable {
            best_split(features, &samples, objective, params, rng)
        } else {
            None
        };

        match split {
            Some(Candidate {
                feature, threshold, ..
            }) => {
                let (left, right): (Vec<usize>, Vec<usize>) = samples
                    .into_iter()
                    .partition(|&s| features[[s, feature]] <= threshold);
                let left_index = nodes.len();
                nodes.push(placeholder());
                let right_index = nodes.len();
                nodes.push(placeholder());
                nodes[index] = TreeNode::Split {
                    feature,
                    threshold,
                    left: left_index,
                    right: right_index,
                };
                stack.push((right_index, right, depth + 1));
                stack.push((left_index, left, depth + 1));
            }
            None => {
                nodes[index] = TreeNode::Leaf {
                    value: objective.leaf(&samples),
                };
            }
        }
    }

    DecisionTree { nodes }
}

fn best_split<O: Objective>(
    features: ArrayView2<'_, f32>,
    samples: &[usize],
    objective: &O,
    params: &TreeParams,
    rng: &mut Rand64,
) -> Option<Candidate> {
    let width = objective.stats_len();
    let mut total = vec![0f64; width];
    for &s in samples {
        objective.accumulate(s, &mut total);
    }
    let parent = objective.impurity(&total, samples.len());
    if parent <= 1e-12 {
        return None;
    }

    let min_leaf = params.min_samples_leaf.max(1);
    let mut best: Option<Candidate> = None;
    let mut order: Vec<(f32, usize)> = Vec::with_capacity(samples.len());
    let mut left = vec![0f64; width];
    let mut right = vec![0f64; width];

    for feature in candidate_features(features.ncols(), params.max_features, rng) {
        order.clear();
        order.extend(samples.iter().map(|&s| (features[[s, feature]], s)));
        order.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        left.iter_mut().for_each(|v| *v = 0.0);

        for i in 0..order.len() - 1 {
            objective.accumulate(order[i].1, &mut left);
            let (a, b) = (order[i].0, order[i + 1].0);
            let n_left = i + 1;
            let n_right = order.len() - n_left;
            if a >= b || n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            for ((r, t), l) in right.iter_mut().zip(&total).zip(&left) {
                *r = t - l;
            }
            let impurity =
                objective.impurity(&left, n_left) + objective.impurity(&right, n_right);
            if impurity < parent - 1e-12 && best.as_ref().is_none_or(|c| impurity < c.impurity) {
                let mid = a + (b - a) / 2.0;
                best = Some(Candidate {
                    feature,
                    threshold: if mid < b { mid } else { a },
                    impurity,
                });
            }
        }
    }
    best
}

/// All features, or a random subset of `max_features` of them.
fn candidate_features(n: usize, max_features: Option<usize>, rng: &mut Rand64) -> Vec<usize> {
    let mut all: Vec<usize> = (0..n).collect();
    let Some(m) = max_features.filter(|&m| m < n) else {
        return all;
    };
    for i in 0..m {
        let j = i + rng.rand_range(0..(n - i) as u64) as usize;
        all.swap(i, j);
    }
    all.truncate(m);
    all
}
