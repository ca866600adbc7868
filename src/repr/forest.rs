//! Canonical forest representation (collection of trees).

use ndarray::ArrayView2;

use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// Forest of regression trees.
///
/// Scoring accumulates every tree's leaf value on top of the base score.
/// Regression artifacts have a single output group, so the forest produces
/// one scalar per row.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f32,
}

impl Forest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base score.
    pub fn with_base_score(mut self, base_score: f32) -> Self {
        self.base_score = base_score;
        self
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Get the base score.
    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Predict the raw margin for a single row of features.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        let mut output = self.base_score;
        for tree in &self.trees {
            output += tree.predict_row(features);
        }
        output
    }

    /// Predict raw margins for a batch of rows, writing into `output`.
    ///
    /// `features` is sample-major: one row per sample, one column per model
    /// feature. Each row is scored exactly like [`predict_row`](Self::predict_row).
    ///
    /// # Panics
    /// Panics if `output.len() != features.nrows()`.
    pub fn predict_into(&self, features: ArrayView2<'_, f32>, output: &mut [f32]) {
        assert_eq!(
            output.len(),
            features.nrows(),
            "output buffer must have one slot per row"
        );

        let mut scratch = Vec::new();
        for (row, out) in features.rows().into_iter().zip(output.iter_mut()) {
            // Non-contiguous views (e.g. column slices) are copied into a
            // scratch buffer; standard-layout rows are scored in place.
            let slice = match row.as_slice() {
                Some(s) => s,
                None => {
                    scratch.clear();
                    scratch.extend(row.iter().copied());
                    scratch.as_slice()
                }
            };

            *out = self.base_score;
            for tree in &self.trees {
                *out += tree.predict_row(slice);
            }
        }
    }

    /// Validate structural invariants for every tree in the forest.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| ForestValidationError::InvalidTree {
                tree_idx: i,
                error: e,
            })?;
        }
        Ok(())
    }
}
