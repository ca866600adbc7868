//! Output transformation for inference.
//!
//! Raw model outputs are margins. Depending on the training objective the
//! margin is the prediction (squared-error family), a log-rate (log-link
//! family), or a logit (logistic). The transform is derived from the
//! artifact's objective at load time so scoring needs no training context.

/// Inference-time output transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTransform {
    /// No transformation; output = margin.
    #[default]
    Identity,

    /// Logistic sigmoid: output = 1 / (1 + exp(-margin)).
    Sigmoid,

    /// Exponential: output = exp(margin). Used by log-link objectives
    /// (poisson, gamma, tweedie).
    Exp,
}

impl OutputTransform {
    /// Derive the transform from an XGBoost objective name.
    pub fn for_objective(objective: &str) -> Self {
        match objective {
            "reg:logistic" => OutputTransform::Sigmoid,
            "count:poisson" | "reg:gamma" | "reg:tweedie" => OutputTransform::Exp,
            _ => OutputTransform::Identity,
        }
    }

    /// Apply the transformation to a single margin.
    #[inline]
    pub fn apply(&self, margin: f32) -> f32 {
        match self {
            OutputTransform::Identity => margin,
            OutputTransform::Sigmoid => sigmoid(margin),
            OutputTransform::Exp => margin.exp(),
        }
    }
}

/// Numerically stable sigmoid.
/// Clamps input to [-500, 500] to prevent overflow.
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}
