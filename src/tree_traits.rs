//! Conversion of subtrees into `termtree::Tree` for box-drawing display.

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::ComponentArena;

pub trait TreeNodeConvert {
    fn to_tree_string(&self, start: Index) -> Tree<String>;
}

impl TreeNodeConvert for ComponentArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, start: Index) -> Tree<String> {
        let Some(node) = self.get_node(start) else {
            return Tree::new("Empty tree".to_string());
        };
        let root = node.name().to_string();

        // Recursively construct the children
        let leaves: Vec<_> = self
            .child_slice(start)
            .iter()
            .map(|&child| self.to_tree_string(child))
            .collect();

        Tree::new(root).with_leaves(leaves)
    }
}
