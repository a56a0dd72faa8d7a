//! Reduction tree shapes for hierarchical tile factorizations.
//!
//! A communication-avoiding tile QR/LU eliminates the tile-rows of a column
//! through reduction trees. This crate provides the closed set of tree
//! shapes ([`TreeTopology`]) and the [`ReductionTree`] each of them produces
//! for an ordered list of leaves.
//!
//! # Example
//!
//! ```
//! use hqr_tree::TreeTopology;
//!
//! let tree = TreeTopology::Binary.build(8);
//! assert_eq!(tree.levels(), 3);
//! assert_eq!(tree.parent(5), Some(4));
//! ```

pub mod error;
/// Tree shapes and their option codes.
pub mod topology;
/// Reduction trees expressed over leaf positions.
pub mod tree;

pub use error::TopologyParseError;
pub use topology::TreeTopology;
pub use tree::{Merge, ReductionTree};
