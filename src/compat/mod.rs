//! Loaders for foreign model formats.

pub mod xgboost;

pub use xgboost::XgbModel;
