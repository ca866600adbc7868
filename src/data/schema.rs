//! Training-column schema and row alignment.
//!
//! The model artifact carries the ordered list of columns it was trained on.
//! Every request row must be reshaped to exactly that list before scoring:
//! training columns absent from the row are zero-filled, row columns unknown
//! to the model are dropped. This mirrors how the training pipeline aligned
//! one-hot expanded frames, so an option that never occurred in training
//! contributes nothing rather than shifting its neighbours.

use std::collections::HashMap;

use super::row::FeatureRow;

/// Ordered training-time feature columns with name lookup.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Create a schema from the model's ordered feature names.
    pub fn new(columns: Vec<String>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { columns, index }
    }

    /// Number of training columns.
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// The training columns, in training order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the training position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Align a named row into a dense vector in training-column order.
    ///
    /// The result always has exactly `n_features()` entries. Missing training
    /// columns are zero-filled (logged at debug level); row cells whose name
    /// the model doesn't know are dropped (logged at warn level, since a
    /// dropped cell usually means an encoding mismatch).
    pub fn align(&self, row: &FeatureRow) -> Vec<f32> {
        let mut out = vec![0.0f32; self.columns.len()];
        let mut filled = vec![false; self.columns.len()];

        for (name, value) in row.iter() {
            match self.position(name) {
                Some(i) => {
                    out[i] = value;
                    filled[i] = true;
                }
                None => {
                    log::warn!("dropping row column unknown to the model: {name:?}");
                }
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            for (i, was_filled) in filled.iter().enumerate() {
                if !was_filled {
                    log::debug!("zero-filling training column absent from row: {:?}", self.columns[i]);
                }
            }
        }

        out
    }
}
