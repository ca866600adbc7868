//! Linear (gblinear) booster representation.

use ndarray::Array1;

/// Linear booster model: one weight per feature plus a bias term.
///
/// The bias already includes the artifact's base score, so scoring a row is
/// a plain dot product plus bias.
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: Array1<f32>,
    bias: f32,
}

impl LinearModel {
    /// Create a model from per-feature weights and a bias.
    pub fn new(weights: Array1<f32>, bias: f32) -> Self {
        Self { weights, bias }
    }

    /// Number of input features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Get the bias term.
    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Predict the raw margin for a single row of features.
    ///
    /// Missing (`NaN`) values contribute zero, matching how a zero-filled
    /// aligned row would score.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        debug_assert_eq!(features.len(), self.weights.len());

        let dot: f32 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(&w, &x)| if x.is_nan() { 0.0 } else { w * x })
            .sum();

        dot + self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn predict_is_dot_plus_bias() {
        let model = LinearModel::new(array![2.0, -1.0, 0.5], 1.0);
        // 2*1 - 1*2 + 0.5*4 + 1 = 3.0
        assert_abs_diff_eq!(model.predict_row(&[1.0, 2.0, 4.0]), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn nan_features_contribute_zero() {
        let model = LinearModel::new(array![2.0, 3.0], 0.5);
        assert_abs_diff_eq!(model.predict_row(&[f32::NAN, 1.0]), 3.5, epsilon = 1e-6);
    }

    #[test]
    fn zero_feature_model_predicts_bias() {
        let model = LinearModel::new(Array1::zeros(0), 4.0);
        assert_abs_diff_eq!(model.predict_row(&[]), 4.0, epsilon = 1e-6);
    }
}
