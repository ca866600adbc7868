//! High-level model handle: load an artifact, score requests, derive plans.

use std::path::Path;

use ndarray::Array2;

use crate::compat::xgboost::{Booster, ConversionError, LoadError, XgbModel};
use crate::data::FeatureSchema;
use crate::form::PredictionRequest;
use crate::inventory::InventoryPlan;

pub mod transform;

pub use transform::OutputTransform;

/// Errors raised while loading or preparing a model for scoring.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("artifact conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("artifact carries no feature names; cannot align request columns")]
    MissingFeatureNames,

    #[error("artifact declares {declared} features but names {names}")]
    FeatureCountMismatch { declared: i64, names: usize },
}

/// A loaded sales-quantity model, ready to score requests.
///
/// Holds the converted booster, the training-column schema taken from the
/// artifact's feature names, and the objective-derived output transform.
/// Loaded once at startup and only ever read afterwards.
#[derive(Debug, Clone)]
pub struct SalesModel {
    booster: Booster,
    schema: FeatureSchema,
    transform: OutputTransform,
    objective: &'static str,
}

impl SalesModel {
    /// Load and convert an XGBoost JSON artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let artifact = XgbModel::from_file(path)?;
        let model = Self::from_artifact(artifact)?;

        log::info!(
            "loaded model from {}: objective {}, {} features, {}",
            path.display(),
            model.objective,
            model.schema.n_features(),
            match &model.booster {
                Booster::Tree(forest) => format!("{} trees", forest.n_trees()),
                Booster::Linear(_) => "linear booster".to_string(),
            }
        );

        Ok(model)
    }

    /// Convert an already-parsed artifact.
    pub fn from_artifact(artifact: XgbModel) -> Result<Self, ModelError> {
        if artifact.learner.feature_names.is_empty() {
            return Err(ModelError::MissingFeatureNames);
        }

        let declared = artifact.learner.learner_model_param.n_features;
        let names = artifact.learner.feature_names.len();
        if declared > 0 && declared as usize != names {
            return Err(ModelError::FeatureCountMismatch { declared, names });
        }

        let schema = FeatureSchema::new(artifact.learner.feature_names.clone());
        let objective = artifact.learner.objective.name();
        let transform = OutputTransform::for_objective(objective);
        let booster = artifact.to_booster()?;

        Ok(Self {
            booster,
            schema,
            transform,
            objective,
        })
    }

    /// The training-column schema.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Number of model features.
    pub fn n_features(&self) -> usize {
        self.schema.n_features()
    }

    /// The artifact's objective name.
    pub fn objective(&self) -> &'static str {
        self.objective
    }

    /// Predict the sales quantity for one request.
    pub fn predict(&self, request: &PredictionRequest) -> f32 {
        let row = request.to_row();
        let features = self.schema.align(&row);
        log::debug!("aligned feature row: {features:?}");

        self.transform.apply(self.booster.predict_row(&features))
    }

    /// Predict sales quantities for several requests at once.
    ///
    /// Rows are aligned into one sample-major matrix and scored identically
    /// to [`predict`](Self::predict).
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> Vec<f32> {
        let n_features = self.schema.n_features();
        let mut features = Array2::<f32>::zeros((requests.len(), n_features));
        for (i, request) in requests.iter().enumerate() {
            let aligned = self.schema.align(&request.to_row());
            features
                .row_mut(i)
                .iter_mut()
                .zip(aligned.iter())
                .for_each(|(slot, &v)| *slot = v);
        }

        let mut output = vec![0.0f32; requests.len()];
        match &self.booster {
            Booster::Tree(forest) => forest.predict_into(features.view(), &mut output),
            Booster::Linear(linear) => {
                for (row, out) in features.rows().into_iter().zip(output.iter_mut()) {
                    *out = linear.predict_row(row.as_slice().expect("row-major layout"));
                }
            }
        }

        for value in &mut output {
            *value = self.transform.apply(*value);
        }
        output
    }

    /// Predict one request and derive its inventory plan.
    pub fn plan(&self, request: &PredictionRequest) -> InventoryPlan {
        InventoryPlan::from_prediction(self.predict(request))
    }
}
