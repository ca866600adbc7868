//! Conversion from XGBoost JSON types to native stockcast types.

use ndarray::Array1;

use crate::repr::{Forest, LinearModel, Tree};

use super::json::{GradientBooster, Tree as XgbTree, XgbModel};

/// A booster model converted from XGBoost.
#[derive(Debug, Clone)]
pub enum Booster {
    /// Gradient boosted tree ensemble.
    Tree(Forest),
    /// Linear (gblinear) booster model.
    Linear(LinearModel),
}

impl Booster {
    /// Predict the raw margin for a single aligned feature row.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        match self {
            Booster::Tree(forest) => forest.predict_row(features),
            Booster::Linear(linear) => linear.predict_row(features),
        }
    }
}

/// Error type for XGBoost model conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),

    #[error("tree {tree}: array {field} has {actual} entries, expected {expected}")]
    ArrayLenMismatch {
        tree: usize,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(
        "invalid node index in tree {tree}: node {node} references child {child} but tree has {num_nodes} nodes"
    )]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },

    #[error(
        "tree {tree}: node {node} uses a categorical split; categorical inputs must be one-hot encoded before training"
    )]
    CategoricalSplit { tree: usize, node: usize },

    #[error("model has {n_class} output classes; only single-output regression is supported")]
    MulticlassUnsupported { n_class: i64 },

    #[error(
        "gblinear weights length {actual} doesn't match num_features + 1 = {expected}"
    )]
    InvalidLinearWeights { actual: usize, expected: usize },
}

/// Convert base_score from probability space to margin space based on objective.
///
/// XGBoost stores base_score in probability/original space in JSON, but the
/// scorer works in margin space. This replicates XGBoost's `ProbToMargin`.
fn prob_to_margin(base_score: f32, objective: &str) -> f32 {
    match objective {
        // Logistic objectives: logit(p) = log(p / (1 - p))
        "reg:logistic" => {
            let p = base_score.clamp(1e-7, 1.0 - 1e-7);
            (p / (1.0 - p)).ln()
        }
        // Log-link objectives
        "reg:gamma" | "reg:tweedie" | "count:poisson" => base_score.max(1e-7).ln(),
        // For other regression objectives, base_score is already in margin space
        _ => base_score,
    }
}

impl XgbModel {
    /// Convert to a native [`Booster`].
    ///
    /// Returns `Booster::Tree` for gbtree models and `Booster::Linear` for
    /// gblinear models. Multiclass artifacts are rejected.
    pub fn to_booster(&self) -> Result<Booster, ConversionError> {
        let n_class = self.learner.learner_model_param.n_class;
        if n_class > 1 {
            return Err(ConversionError::MulticlassUnsupported { n_class });
        }

        match &self.learner.gradient_booster {
            GradientBooster::Gbtree { .. } => Ok(Booster::Tree(self.to_forest()?)),
            GradientBooster::Gblinear { model } => {
                Ok(Booster::Linear(self.convert_linear_model(&model.weights)?))
            }
        }
    }

    /// Convert to a native [`Forest`].
    ///
    /// Only gbtree boosters convert to a forest; for gblinear models use
    /// [`to_booster()`](Self::to_booster) instead.
    pub fn to_forest(&self) -> Result<Forest, ConversionError> {
        let model_trees = match &self.learner.gradient_booster {
            GradientBooster::Gbtree { model } => model,
            GradientBooster::Gblinear { .. } => {
                return Err(ConversionError::InvalidLinearWeights {
                    actual: 0,
                    expected: 0,
                });
            }
        };

        let raw_base_score = self.learner.learner_model_param.base_score;
        let objective = self.learner.objective.name();
        let margin_base_score = prob_to_margin(raw_base_score, objective);

        let mut forest = Forest::new().with_base_score(margin_base_score);
        for (tree_idx, xgb_tree) in model_trees.trees.iter().enumerate() {
            forest.push_tree(convert_tree(xgb_tree, tree_idx)?);
        }

        Ok(forest)
    }

    /// Returns true if this model uses a gblinear booster.
    pub fn is_linear(&self) -> bool {
        matches!(
            &self.learner.gradient_booster,
            GradientBooster::Gblinear { .. }
        )
    }

    /// Convert gblinear weights to a [`LinearModel`].
    ///
    /// XGBoost stores weights as `[w_0, ..., w_{n-1}, bias]`. The base_score
    /// is baked into the bias so that scoring needs no extra parameters.
    fn convert_linear_model(&self, weights: &[f32]) -> Result<LinearModel, ConversionError> {
        let num_features = self.learner.learner_model_param.n_features as usize;

        let expected_len = num_features + 1;
        if weights.len() != expected_len {
            return Err(ConversionError::InvalidLinearWeights {
                actual: weights.len(),
                expected: expected_len,
            });
        }

        let raw_base_score = self.learner.learner_model_param.base_score;
        let objective = self.learner.objective.name();
        let margin_base_score = prob_to_margin(raw_base_score, objective);

        let coefs = Array1::from_iter(weights[..num_features].iter().copied());
        let bias = weights[num_features] + margin_base_score;

        Ok(LinearModel::new(coefs, bias))
    }
}

/// Convert a single XGBoost tree to a native [`Tree`].
fn convert_tree(xgb_tree: &XgbTree, tree_idx: usize) -> Result<Tree, ConversionError> {
    let num_nodes = xgb_tree.tree_param.num_nodes as usize;
    if num_nodes == 0 {
        return Err(ConversionError::EmptyTree(tree_idx));
    }

    check_len(tree_idx, "left_children", num_nodes, xgb_tree.left_children.len())?;
    check_len(tree_idx, "right_children", num_nodes, xgb_tree.right_children.len())?;
    check_len(tree_idx, "split_indices", num_nodes, xgb_tree.split_indices.len())?;
    check_len(tree_idx, "split_conditions", num_nodes, xgb_tree.split_conditions.len())?;
    check_len(tree_idx, "default_left", num_nodes, xgb_tree.default_left.len())?;
    check_len(tree_idx, "base_weights", num_nodes, xgb_tree.base_weights.len())?;

    let mut split_indices = Vec::with_capacity(num_nodes);
    let mut split_thresholds = Vec::with_capacity(num_nodes);
    let mut left_children = Vec::with_capacity(num_nodes);
    let mut right_children = Vec::with_capacity(num_nodes);
    let mut default_left = Vec::with_capacity(num_nodes);
    let mut is_leaf = Vec::with_capacity(num_nodes);
    let mut leaf_values = Vec::with_capacity(num_nodes);

    for node_idx in 0..num_nodes {
        let left_child = xgb_tree.left_children[node_idx];
        let right_child = xgb_tree.right_children[node_idx];

        // A node is a leaf if left_child == -1 (XGBoost convention)
        let node_is_leaf = left_child == -1;

        if node_is_leaf {
            split_indices.push(0);
            split_thresholds.push(0.0);
            left_children.push(0);
            right_children.push(0);
            default_left.push(false);
            is_leaf.push(true);
            // Leaf node: base_weights contains the leaf value
            leaf_values.push(xgb_tree.base_weights[node_idx]);
            continue;
        }

        // Split node: validate child indices
        if left_child < 0 || left_child as usize >= num_nodes {
            return Err(ConversionError::InvalidNodeIndex {
                tree: tree_idx,
                node: node_idx,
                child: left_child,
                num_nodes,
            });
        }
        if right_child < 0 || right_child as usize >= num_nodes {
            return Err(ConversionError::InvalidNodeIndex {
                tree: tree_idx,
                node: node_idx,
                child: right_child,
                num_nodes,
            });
        }

        // XGBoost split_type: 0 = numeric, 1 = categorical
        if xgb_tree.split_type.get(node_idx).copied().unwrap_or(0) != 0 {
            return Err(ConversionError::CategoricalSplit {
                tree: tree_idx,
                node: node_idx,
            });
        }

        split_indices.push(xgb_tree.split_indices[node_idx] as u32);
        split_thresholds.push(xgb_tree.split_conditions[node_idx]);
        left_children.push(left_child as u32);
        right_children.push(right_child as u32);
        default_left.push(xgb_tree.default_left[node_idx] != 0);
        is_leaf.push(false);
        leaf_values.push(0.0);
    }

    Ok(Tree::new(
        split_indices,
        split_thresholds,
        left_children,
        right_children,
        default_left,
        is_leaf,
        leaf_values,
    ))
}

fn check_len(
    tree: usize,
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ConversionError> {
    if actual != expected {
        return Err(ConversionError::ArrayLenMismatch {
            tree,
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A two-tree regression artifact with hand-checkable splits:
    ///
    /// Tree 0: feat1 < 100.0 -> leaf 10.0 | leaf 30.0
    /// Tree 1: feat0 < 0.5   -> leaf  2.0 | leaf  5.0
    fn gbtree_fixture() -> XgbModel {
        let v = json!({
            "version": [2, 0, 0],
            "learner": {
                "feature_names": ["a", "b"],
                "gradient_booster": {
                    "name": "gbtree",
                    "model": {
                        "trees": [
                            {
                                "tree_param": {"num_nodes": "3", "num_feature": "2"},
                                "base_weights": [0.0, 10.0, 30.0],
                                "left_children": [1, -1, -1],
                                "right_children": [2, -1, -1],
                                "split_indices": [1, 0, 0],
                                "split_conditions": [100.0, 0.0, 0.0],
                                "default_left": [1, 0, 0],
                                "split_type": [0, 0, 0]
                            },
                            {
                                "tree_param": {"num_nodes": "3", "num_feature": "2"},
                                "base_weights": [0.0, 2.0, 5.0],
                                "left_children": [1, -1, -1],
                                "right_children": [2, -1, -1],
                                "split_indices": [0, 0, 0],
                                "split_conditions": [0.5, 0.0, 0.0],
                                "default_left": [0, 0, 0],
                                "split_type": [0, 0, 0]
                            }
                        ],
                        "tree_info": [0, 0],
                        "gbtree_model_param": {"num_trees": "2", "num_parallel_tree": "1"}
                    }
                },
                "objective": {"name": "reg:squarederror"},
                "learner_model_param": {"base_score": "5E-1", "num_class": "0", "num_feature": "2"}
            }
        });
        XgbModel::from_value(&v).unwrap()
    }

    #[test]
    fn convert_gbtree_regression() {
        let model = gbtree_fixture();
        let forest = model.to_forest().expect("conversion failed");

        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.base_score(), 0.5);
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn converted_forest_predicts_known_values() {
        let forest = gbtree_fixture().to_forest().unwrap();

        // a=0.7 (>= 0.5), b=50 (< 100): 0.5 + 10 + 5 = 15.5
        assert_eq!(forest.predict_row(&[0.7, 50.0]), 15.5);
        // a=0.3 (< 0.5), b=200 (>= 100): 0.5 + 30 + 2 = 32.5
        assert_eq!(forest.predict_row(&[0.3, 200.0]), 32.5);
    }

    #[test]
    fn missing_feature_uses_default_direction() {
        let forest = gbtree_fixture().to_forest().unwrap();

        // b=NaN defaults left in tree 0 (10.0); a=0.7 goes right in tree 1 (5.0).
        assert_eq!(forest.predict_row(&[0.7, f32::NAN]), 15.5);
    }

    #[test]
    fn to_booster_gbtree_returns_tree() {
        let booster = gbtree_fixture().to_booster().expect("conversion failed");
        match booster {
            Booster::Tree(forest) => assert_eq!(forest.n_trees(), 2),
            Booster::Linear(_) => panic!("expected Booster::Tree"),
        }
    }

    #[test]
    fn convert_rejects_categorical_split() {
        let mut model = gbtree_fixture();
        if let GradientBooster::Gbtree { model: trees } = &mut model.learner.gradient_booster {
            trees.trees[0].split_type[0] = 1;
        }

        match model.to_forest() {
            Err(ConversionError::CategoricalSplit { tree: 0, node: 0 }) => {}
            other => panic!("expected CategoricalSplit, got {other:?}"),
        }
    }

    #[test]
    fn convert_rejects_bad_child_index() {
        let mut model = gbtree_fixture();
        if let GradientBooster::Gbtree { model: trees } = &mut model.learner.gradient_booster {
            trees.trees[1].right_children[0] = 9;
        }

        match model.to_forest() {
            Err(ConversionError::InvalidNodeIndex {
                tree: 1,
                node: 0,
                child: 9,
                num_nodes: 3,
            }) => {}
            other => panic!("expected InvalidNodeIndex, got {other:?}"),
        }
    }

    #[test]
    fn convert_rejects_array_len_mismatch() {
        let mut model = gbtree_fixture();
        if let GradientBooster::Gbtree { model: trees } = &mut model.learner.gradient_booster {
            trees.trees[0].base_weights.pop();
        }

        match model.to_forest() {
            Err(ConversionError::ArrayLenMismatch {
                tree: 0,
                field: "base_weights",
                expected: 3,
                actual: 2,
            }) => {}
            other => panic!("expected ArrayLenMismatch, got {other:?}"),
        }
    }

    fn gblinear_fixture(objective: &str, base_score: f32) -> XgbModel {
        let v = json!({
            "version": [2, 0, 0],
            "learner": {
                "feature_names": ["a", "b", "c"],
                "gradient_booster": {
                    "name": "gblinear",
                    "model": {"weights": [2.0, -1.0, 0.5, 1.0]}
                },
                "objective": {"name": objective},
                "learner_model_param": {
                    "base_score": base_score.to_string(),
                    "num_class": "0",
                    "num_feature": "3"
                }
            }
        });
        XgbModel::from_value(&v).unwrap()
    }

    #[test]
    fn convert_gblinear_regression() {
        let model = gblinear_fixture("reg:squarederror", 0.5);
        assert!(model.is_linear());

        let booster = model.to_booster().expect("conversion failed");
        match booster {
            Booster::Linear(linear) => {
                assert_eq!(linear.n_features(), 3);
                // bias 1.0 + base_score 0.5
                assert!((linear.bias() - 1.5).abs() < 1e-6);
                // 2*1 - 1*0 + 0.5*2 + 1.5 = 4.5
                assert!((linear.predict_row(&[1.0, 0.0, 2.0]) - 4.5).abs() < 1e-6);
            }
            Booster::Tree(_) => panic!("expected Booster::Linear"),
        }
    }

    #[test]
    fn gblinear_wrong_weight_count_is_rejected() {
        let v = json!({
            "version": [2, 0, 0],
            "learner": {
                "feature_names": ["a", "b", "c"],
                "gradient_booster": {
                    "name": "gblinear",
                    "model": {"weights": [2.0, -1.0]}
                },
                "objective": {"name": "reg:squarederror"},
                "learner_model_param": {"base_score": "0", "num_class": "0", "num_feature": "3"}
            }
        });
        let model = XgbModel::from_value(&v).unwrap();

        match model.to_booster() {
            Err(ConversionError::InvalidLinearWeights {
                actual: 2,
                expected: 4,
            }) => {}
            other => panic!("expected InvalidLinearWeights, got {other:?}"),
        }
    }

    #[test]
    fn gblinear_to_forest_fails() {
        let model = gblinear_fixture("reg:squarederror", 0.0);
        assert!(model.to_forest().is_err());
    }

    #[test]
    fn multiclass_artifact_is_rejected() {
        let v = json!({
            "version": [2, 0, 0],
            "learner": {
                "feature_names": ["a"],
                "gradient_booster": {
                    "name": "gblinear",
                    "model": {"weights": [1.0, 0.0]}
                },
                "objective": {"name": "reg:squarederror"},
                "learner_model_param": {"base_score": "0", "num_class": "3", "num_feature": "1"}
            }
        });
        let model = XgbModel::from_value(&v).unwrap();

        match model.to_booster() {
            Err(ConversionError::MulticlassUnsupported { n_class: 3 }) => {}
            other => panic!("expected MulticlassUnsupported, got {other:?}"),
        }
    }

    #[test]
    fn log_link_base_score_moves_to_margin_space() {
        let model = gblinear_fixture("reg:gamma", 1.0);
        let booster = model.to_booster().unwrap();
        match booster {
            // ln(1.0) = 0, so bias stays at the stored 1.0
            Booster::Linear(linear) => assert!((linear.bias() - 1.0).abs() < 1e-6),
            Booster::Tree(_) => panic!("expected Booster::Linear"),
        }
    }
}
