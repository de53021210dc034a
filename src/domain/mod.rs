//! Domain layer: the component tree and its invariants
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;

pub use arena::{
    ComponentArena, ComponentNode, NodeKind, PostOrderIterator, PrintLines, RenderOptions,
    TreeIterator,
};
pub use error::{StructuralError, StructuralResult};
