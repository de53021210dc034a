//! Composite component trees.
//!
//! A [`ComponentArena`] owns named nodes of two variants (leaf, container)
//! forming rooted, ordered, acyclic hierarchies with uniform add/remove/print
//! operations. Structural violations (cycles, double ownership, child
//! operations on leaves) surface as typed [`StructuralError`]s instead of
//! silent no-ops; every operation either fully succeeds or leaves the tree
//! unchanged.

pub mod domain;
pub mod tree_traits;
pub mod util;

pub use domain::{
    ComponentArena, ComponentNode, NodeKind, RenderOptions, StructuralError, StructuralResult,
};
pub use tree_traits::TreeNodeConvert;
