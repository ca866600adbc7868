//! Native model representations for inference.
//!
//! A loaded artifact is converted into one of two read-only shapes:
//! a [`Forest`] of decision trees (gbtree boosters) or a [`LinearModel`]
//! (gblinear boosters). Both score a single dense feature row.

/// Canonical node identifier used by the tree representation.
///
/// Internally this is just an index into the tree's SoA arrays.
pub type NodeId = u32;

pub mod forest;
pub mod linear;
pub mod tree;

pub use forest::{Forest, ForestValidationError};
pub use linear::LinearModel;
pub use tree::{Tree, TreeValidationError};
