use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::Classifier;
use super::scale::Standardizer;
use crate::error::Result;

/// k-nearest-neighbors vote over the standardized training set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNearest {
    pub k: usize,
    pub n_classes: usize,
    pub scaler: Standardizer,
    /// Standardized training rows.
    pub points: Vec<Vec<f32>>,
    pub targets: Vec<usize>,
}

impl KNearest {
    /// Majority class among the `k` nearest points. Ties go to the class whose
    /// neighbors are closer in total, then to the lower class index.
    fn vote(&self, query: ArrayView1<'_, f32>) -> usize {
        let mut distances: Vec<(f32, usize)> = self
            .points
            .iter()
            .zip(&self.targets)
            .map(|(point, &target)| {
                let d: f32 = point
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (d, target)
            })
            .collect();

        let k = self.k.min(distances.len());
        if k == 0 {
            return 0;
        }
        distances.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0));

        let mut counts = vec![0usize; self.n_classes.max(1)];
        let mut totals = vec![0f32; self.n_classes.max(1)];
        for &(d, target) in &distances[..k] {
            if let (Some(count), Some(total)) = (counts.get_mut(target), totals.get_mut(target)) {
                *count += 1;
                *total += d.sqrt();
            }
        }

        let mut best = 0;
        for class in 1..counts.len() {
            if counts[class] > counts[best]
                || (counts[class] == counts[best] && counts[class] > 0 && totals[class] < totals[best])
            {
                best = class;
            }
        }
        best
    }
}

impl Classifier for KNearest {
    fn predict_classes(&self, features: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        let scaled = self.scaler.transform(features);
        Ok(scaled.rows().into_iter().map(|row| self.vote(row)).collect())
    }
}
