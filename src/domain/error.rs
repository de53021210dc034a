//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Structural errors represent tree invariant violations.
/// Every operation either fully succeeds or fails with one of these
/// and leaves the tree unchanged.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StructuralError {
    #[error("not a container: {name}")]
    NotAContainer { name: String },

    #[error("cycle detected in hierarchy: {name}")]
    CycleDetected { name: String },

    #[error("node already attached to another container: {name}")]
    AlreadyAttached { name: String },

    #[error("node is not a child of container: {name}")]
    NotFound { name: String },

    #[error("node name must not be empty")]
    EmptyName,

    #[error("unknown node handle: {0:?}")]
    UnknownNode(Index),
}

/// Result type for structural tree operations.
pub type StructuralResult<T> = Result<T, StructuralError>;
