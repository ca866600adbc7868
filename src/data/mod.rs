//! Feature schema and single-row assembly.

pub mod row;
pub mod schema;

pub use row::FeatureRow;
pub use schema::FeatureSchema;
