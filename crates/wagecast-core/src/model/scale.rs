use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Per-column standardization fitted on training data.
///
/// Constant columns keep a scale of 1 so they map to 0 instead of `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl Standardizer {
    /// Fits column means and population standard deviations.
    #[must_use]
    pub fn fit(features: ArrayView2<'_, f32>) -> Self {
        let n = features.nrows().max(1) as f64;
        let mut mean = Vec::with_capacity(features.ncols());
        let mut scale = Vec::with_capacity(features.ncols());

        for column in features.columns() {
            let m = column.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
            let var = column
                .iter()
                .map(|&v| (f64::from(v) - m).powi(2))
                .sum::<f64>()
                / n;
            let sd = var.sqrt();
            mean.push(m as f32);
            scale.push(if sd > 1e-8 { sd as f32 } else { 1.0 });
        }

        Self { mean, scale }
    }

    /// Applies the fitted transform to every row.
    #[must_use]
    pub fn transform(&self, features: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut out = features.to_owned();
        for (mut column, (&m, &s)) in out
            .columns_mut()
            .into_iter()
            .zip(self.mean.iter().zip(&self.scale))
        {
            column.mapv_inplace(|v| (v - m) / s);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn centers_and_scales() {
        let x = array![[1.0f32, 5.0], [3.0, 5.0]];
        let scaler = Standardizer::fit(x.view());
        assert_eq!(scaler.mean, vec![2.0, 5.0]);
        assert_eq!(scaler.scale, vec![1.0, 1.0]);

        let z = scaler.transform(x.view());
        assert_eq!(z, array![[-1.0f32, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn empty_input_is_harmless() {
        let x = Array2::<f32>::zeros((0, 3));
        let scaler = Standardizer::fit(x.view());
        assert_eq!(scaler.mean.len(), 3);
        assert_eq!(scaler.transform(x.view()).dim(), (0, 3));
    }
}
