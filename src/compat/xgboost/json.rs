//! XGBoost JSON model loader.
//!
//! Parses the XGBoost >= 2.0 JSON format. These are "foreign types" used only
//! for parsing; conversion to native stockcast types lives in
//! [`convert`](super::convert).
//!
//! Only the booster kinds a regression artifact can contain are modelled:
//! `gbtree` and `gblinear`. Unknown JSON keys are ignored.

use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};

/// Errors raised while reading an artifact from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Custom deserializers for XGBoost-specific formats
// =============================================================================

/// XGBoost serializes `base_score` inconsistently across versions: a number,
/// a stringified number, an array, or a stringified array like `"[5E-1]"`.
/// Unwrap whatever shape arrives down to a scalar.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SerdeError::custom("invalid number"));
            }
            Value::String(s) => {
                if let Ok(f) = s.parse::<f32>() {
                    return Ok(f);
                }
                let t = s.trim();
                if t.starts_with('[') && t.ends_with(']') {
                    if let Ok(f) = t[1..t.len() - 1].parse::<f32>() {
                        return Ok(f);
                    }
                }
                return Err(SerdeError::custom(format!(
                    "cannot parse base_score from string: {}",
                    s
                )));
            }
            Value::Array(arr) => {
                cur = arr
                    .into_iter()
                    .next()
                    .ok_or_else(|| SerdeError::custom("empty array"))?;
            }
            _ => {
                return Err(SerdeError::custom(
                    "base_score must be number, string, or array",
                ));
            }
        }
    }
}

// =============================================================================
// Default value helpers for serde
// =============================================================================

fn default_scale_pos_weight() -> f32 {
    1.0
}
fn default_max_delta_step() -> f32 {
    0.7
}
fn default_tweedie_variance_power() -> f32 {
    1.5
}

// =============================================================================
// Tree / model level definitions
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
    #[serde_as(as = "DisplayFromStr")]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    pub base_weights: Vec<f32>,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    pub split_conditions: Vec<f32>,
    pub default_left: Vec<i32>,
    /// 0 = numeric, 1 = categorical. Absent in older artifacts.
    #[serde(default)]
    pub split_type: Vec<i32>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GBTreeModelParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_trees: i64,
    #[serde_as(as = "DisplayFromStr")]
    pub num_parallel_tree: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
    pub tree_info: Vec<i32>,
    pub gbtree_model_param: GBTreeModelParam,
}

impl ModelTrees {
    /// Number of trees in this model.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

// =============================================================================
// Gradient booster variants (gbtree | gblinear)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbLinearModel {
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree { model: ModelTrees },
    Gblinear { model: GbLinearModel },
}

// =============================================================================
// Objective / learner-level definitions
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegLossParam {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_scale_pos_weight")]
    pub scale_pos_weight: f32,
}

impl Default for RegLossParam {
    fn default() -> Self {
        Self {
            scale_pos_weight: 1.0,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoissonRegressionParam {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_max_delta_step")]
    pub max_delta_step: f32,
}

impl Default for PoissonRegressionParam {
    fn default() -> Self {
        Self {
            max_delta_step: 0.7,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweedieRegressionParam {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_tweedie_variance_power")]
    pub tweedie_variance_power: f32,
}

impl Default for TweedieRegressionParam {
    fn default() -> Self {
        Self {
            tweedie_variance_power: 1.5,
        }
    }
}

/// Training objective, restricted to the single-output regression family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum Objective {
    #[serde(rename = "reg:squarederror")]
    RegSquaredError {
        #[serde(default)]
        reg_loss_param: RegLossParam,
    },
    #[serde(rename = "reg:squaredlogerror")]
    RegSquaredLogError {
        #[serde(default)]
        reg_loss_param: RegLossParam,
    },
    #[serde(rename = "reg:linear")]
    RegLinear {
        #[serde(default)]
        reg_loss_param: RegLossParam,
    },
    #[serde(rename = "reg:pseudohubererror")]
    RegPseudohuberError {
        #[serde(default)]
        reg_loss_param: RegLossParam,
    },
    #[serde(rename = "reg:absoluteerror")]
    RegAbsoluteError,
    #[serde(rename = "reg:logistic")]
    RegLogistic {
        #[serde(default)]
        reg_loss_param: RegLossParam,
    },
    #[serde(rename = "count:poisson")]
    CountPoisson {
        #[serde(default)]
        poisson_regression_param: PoissonRegressionParam,
    },
    #[serde(rename = "reg:gamma")]
    RegGamma,
    #[serde(rename = "reg:tweedie")]
    RegTweedie {
        #[serde(default)]
        tweedie_regression_param: TweedieRegressionParam,
    },
}

impl Objective {
    /// Get the objective name as it appears in XGBoost JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Objective::RegSquaredError { .. } => "reg:squarederror",
            Objective::RegSquaredLogError { .. } => "reg:squaredlogerror",
            Objective::RegLinear { .. } => "reg:linear",
            Objective::RegPseudohuberError { .. } => "reg:pseudohubererror",
            Objective::RegAbsoluteError => "reg:absoluteerror",
            Objective::RegLogistic { .. } => "reg:logistic",
            Objective::CountPoisson { .. } => "count:poisson",
            Objective::RegGamma => "reg:gamma",
            Objective::RegTweedie { .. } => "reg:tweedie",
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f32,
    #[serde(rename = "num_class")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_class: i64,
    #[serde(rename = "num_feature")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_features: i64,
}

impl Default for LearnerModelParam {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            n_class: 1,
            n_features: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: Objective,
    pub learner_model_param: LearnerModelParam,
}

// =============================================================================
// Top-level XGBoost model
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbModel {
    pub version: [u32; 3],
    pub learner: Learner,
}

impl XgbModel {
    /// Load a model from a JSON file.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use stockcast::compat::xgboost::XgbModel;
    ///
    /// let model = XgbModel::from_file("xgboost_model.json")?;
    /// let booster = model.to_booster()?;
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a model from a serde_json Value.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_score_parses_number_string_array_and_bracketed() {
        let v_num = json!({"base_score": 1.5, "num_class": "1", "num_feature": "0"});
        let p_num: LearnerModelParam = serde_json::from_value(v_num).unwrap();
        assert_eq!(p_num.base_score, 1.5);

        let v_str = json!({"base_score": "1.5", "num_class": "1", "num_feature": "0"});
        let p_str: LearnerModelParam = serde_json::from_value(v_str).unwrap();
        assert_eq!(p_str.base_score, 1.5);

        let v_arr = json!({"base_score": [1.5], "num_class": "1", "num_feature": "0"});
        let p_arr: LearnerModelParam = serde_json::from_value(v_arr).unwrap();
        assert_eq!(p_arr.base_score, 1.5);

        let v_bracketed = json!({"base_score": "[1.5E0]", "num_class": "1", "num_feature": "0"});
        let p_bracketed: LearnerModelParam = serde_json::from_value(v_bracketed).unwrap();
        assert_eq!(p_bracketed.base_score, 1.5);
    }

    #[test]
    fn base_score_scientific_notation() {
        let v = json!({"base_score": "5E-1", "num_class": "0", "num_feature": "17"});
        let p: LearnerModelParam = serde_json::from_value(v).unwrap();
        assert_eq!(p.base_score, 0.5);
        assert_eq!(p.n_features, 17);
    }

    #[test]
    fn objective_parses_with_defaulted_params() {
        let v = json!({"name": "reg:squarederror"});
        let obj: Objective = serde_json::from_value(v).unwrap();
        assert_eq!(obj.name(), "reg:squarederror");

        let v = json!({"name": "reg:tweedie", "tweedie_regression_param": {"tweedie_variance_power": "1.2"}});
        let obj: Objective = serde_json::from_value(v).unwrap();
        match obj {
            Objective::RegTweedie {
                tweedie_regression_param,
            } => {
                assert_eq!(tweedie_regression_param.tweedie_variance_power, 1.2);
            }
            other => panic!("expected reg:tweedie, got {other:?}"),
        }
    }

    #[test]
    fn classification_objective_is_rejected() {
        let v = json!({"name": "multi:softprob"});
        assert!(serde_json::from_value::<Objective>(v).is_err());
    }

    #[test]
    fn gradient_booster_dispatches_on_name() {
        let v = json!({
            "name": "gblinear",
            "model": {"weights": [0.5, -0.25, 1.0]}
        });
        let booster: GradientBooster = serde_json::from_value(v).unwrap();
        match booster {
            GradientBooster::Gblinear { model } => {
                assert_eq!(model.weights, vec![0.5, -0.25, 1.0]);
            }
            other => panic!("expected gblinear, got {other:?}"),
        }
    }

    #[test]
    fn dart_booster_is_rejected() {
        let v = json!({
            "name": "dart",
            "gbtree": {},
            "weight_drop": []
        });
        assert!(serde_json::from_value::<GradientBooster>(v).is_err());
    }

    #[test]
    fn tree_split_type_defaults_to_empty() {
        let v = json!({
            "tree_param": {"num_nodes": "1", "num_feature": "2"},
            "base_weights": [0.5],
            "left_children": [-1],
            "right_children": [-1],
            "split_indices": [0],
            "split_conditions": [0.0],
            "default_left": [0]
        });
        let tree: Tree = serde_json::from_value(v).unwrap();
        assert!(tree.split_type.is_empty());
        assert_eq!(tree.tree_param.num_nodes, 1);
    }
}
