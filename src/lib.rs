//! stockcast: sales-quantity prediction and inventory planning.
//!
//! Loads a pre-trained XGBoost regression model, rebuilds the training-time
//! feature row from a handful of business inputs, scores it natively, and
//! derives three inventory heuristics from the prediction.
//!
//! # Key Types
//!
//! - [`SalesModel`] - Loaded artifact with schema-aligned scoring
//! - [`PredictionRequest`] - The validated form inputs
//! - [`InventoryPlan`] - Prediction plus derived inventory figures
//!
//! # Loading XGBoost Models
//!
//! Use [`compat::xgboost::XgbModel`] to parse JSON artifacts directly, or
//! [`SalesModel::load`] for the full load-convert-align pipeline.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod compat;
pub mod data;
pub mod form;
pub mod inventory;
pub mod model;
pub mod repr;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use data::{FeatureRow, FeatureSchema};
pub use form::{FieldError, Machinery, PredictionRequest, Region};
pub use inventory::{InventoryPlan, StockSuggestion};
pub use model::{ModelError, OutputTransform, SalesModel};
