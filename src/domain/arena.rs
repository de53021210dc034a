use generational_arena::{Arena, Index};
use itertools::Itertools;
use std::fmt;
use tracing::instrument;

use crate::domain::error::{StructuralError, StructuralResult};

/// Variant payload for tree nodes.
#[derive(Debug)]
pub enum NodeKind {
    /// Terminal node, never has children.
    Leaf,
    /// Interior node owning an ordered sequence of child handles.
    Container { children: Vec<Index> },
}

/// Tree node in the arena-based component hierarchy.
///
/// The label is fixed at construction; structure (parent link, children)
/// only changes through [`ComponentArena::add`] and [`ComponentArena::remove`].
#[derive(Debug)]
pub struct ComponentNode {
    name: String,
    parent: Option<Index>,
    kind: NodeKind,
}

impl ComponentNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning container, None while detached.
    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_container()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

impl fmt::Display for ComponentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Options for plain-line rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Spaces per indent level.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Arena-based component tree for composite hierarchies.
///
/// Uses generational arena for memory-safe node handles and O(1) lookups.
/// One arena may hold several independent trees plus detached nodes; every
/// operation takes explicit node handles, so there is no designated root.
///
/// Mutations require `&mut self`, which serializes them against all reads
/// on the same arena.
#[derive(Debug)]
pub struct ComponentArena {
    /// Arena storage for all tree nodes
    arena: Arena<ComponentNode>,
}

impl Default for ComponentArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    /// Number of nodes in the arena, attached or detached.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Create a detached leaf node.
    #[instrument(level = "trace", skip(self))]
    pub fn new_leaf(&mut self, name: &str) -> StructuralResult<Index> {
        Self::validate_name(name)?;
        Ok(self.arena.insert(ComponentNode {
            name: name.to_string(),
            parent: None,
            kind: NodeKind::Leaf,
        }))
    }

    /// Create a detached container node with no children.
    #[instrument(level = "trace", skip(self))]
    pub fn new_container(&mut self, name: &str) -> StructuralResult<Index> {
        Self::validate_name(name)?;
        Ok(self.arena.insert(ComponentNode {
            name: name.to_string(),
            parent: None,
            kind: NodeKind::Container {
                children: Vec::new(),
            },
        }))
    }

    fn validate_name(name: &str) -> StructuralResult<()> {
        if name.is_empty() {
            return Err(StructuralError::EmptyName);
        }
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&ComponentNode> {
        self.arena.get(idx)
    }

    fn node(&self, idx: Index) -> StructuralResult<&ComponentNode> {
        self.arena.get(idx).ok_or(StructuralError::UnknownNode(idx))
    }

    /// Immutable label of a node.
    #[instrument(level = "trace", skip(self))]
    pub fn name(&self, idx: Index) -> StructuralResult<&str> {
        Ok(self.node(idx)?.name())
    }

    /// Owning container of a node, None while detached (or handle stale).
    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|n| n.parent)
    }

    /// A node is attached while exactly one container owns it.
    pub fn is_attached(&self, idx: Index) -> bool {
        self.parent(idx).is_some()
    }

    pub fn is_container(&self, idx: Index) -> StructuralResult<bool> {
        Ok(self.node(idx)?.is_container())
    }

    pub fn is_leaf(&self, idx: Index) -> StructuralResult<bool> {
        Ok(self.node(idx)?.is_leaf())
    }

    /// Ordered child handles of a container (read-only view).
    #[instrument(level = "trace", skip(self))]
    pub fn children(&self, idx: Index) -> StructuralResult<&[Index]> {
        let node = self.node(idx)?;
        match &node.kind {
            NodeKind::Container { children } => Ok(children),
            NodeKind::Leaf => Err(StructuralError::NotAContainer {
                name: node.name.clone(),
            }),
        }
    }

    /// Child handles of any node; empty for leaves and stale handles.
    pub(crate) fn child_slice(&self, idx: Index) -> &[Index] {
        match self.arena.get(idx).map(|n| &n.kind) {
            Some(NodeKind::Container { children }) => children,
            _ => &[],
        }
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Checks run in order: handle validity, container-ness of `parent`,
    /// acyclicity, current ownership. Re-adding a node already owned by
    /// `parent` is a no-op success. Any failure leaves the arena unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn add(&mut self, parent: Index, child: Index) -> StructuralResult<()> {
        {
            let node = self.node(parent)?;
            if node.is_leaf() {
                return Err(StructuralError::NotAContainer {
                    name: node.name.clone(),
                });
            }
        }
        let child_name = self.node(child)?.name.clone();

        // Walking up from `parent` finds `child` exactly when the attach
        // would close a cycle (self-attach included).
        if self.is_ancestor_or_self(child, parent) {
            return Err(StructuralError::CycleDetected { name: child_name });
        }

        match self.node(child)?.parent {
            Some(current) if current == parent => return Ok(()),
            Some(_) => return Err(StructuralError::AlreadyAttached { name: child_name }),
            None => {}
        }

        if let Some(node) = self.arena.get_mut(parent) {
            if let NodeKind::Container { children } = &mut node.kind {
                children.push(child);
            }
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Detach `child` from `parent`, preserving sibling order.
    ///
    /// The subtree below `child` stays intact and can be re-attached
    /// anywhere (including back where it was).
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, parent: Index, child: Index) -> StructuralResult<()> {
        let pos = {
            let node = self.node(parent)?;
            match &node.kind {
                NodeKind::Container { children } => children.iter().position(|&c| c == child),
                NodeKind::Leaf => {
                    return Err(StructuralError::NotAContainer {
                        name: node.name.clone(),
                    })
                }
            }
        };
        let child_name = self.node(child)?.name.clone();
        let pos = match pos {
            Some(p) => p,
            None => return Err(StructuralError::NotFound { name: child_name }),
        };

        if let Some(node) = self.arena.get_mut(parent) {
            if let NodeKind::Container { children } = &mut node.kind {
                children.remove(pos);
            }
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = None;
        }
        Ok(())
    }

    /// True when `candidate` is `node` itself or an ancestor of `node`.
    fn is_ancestor_or_self(&self, candidate: Index, node: Index) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == candidate {
                return true;
            }
            current = self.arena.get(idx).and_then(|n| n.parent);
        }
        false
    }

    /// Pre-order iterator over the subtree rooted at `start`.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_from(&self, start: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, start)
    }

    /// Post-order iterator over the subtree rooted at `start`.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder_from(&self, start: Index) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, start)
    }

    /// Lazy pre-order line renderer for the subtree rooted at `start`.
    ///
    /// Emits the node's own label at `indent_level`, then every descendant
    /// one level deeper than its parent, left-to-right. Restartable and
    /// pure: repeated calls yield identical output for an unchanged tree.
    #[instrument(level = "trace", skip(self))]
    pub fn print_lines(&self, start: Index, indent_level: usize) -> PrintLines<'_> {
        self.print_lines_with(start, indent_level, RenderOptions::default())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn print_lines_with(
        &self,
        start: Index,
        indent_level: usize,
        options: RenderOptions,
    ) -> PrintLines<'_> {
        PrintLines::new(self, start, indent_level, options)
    }

    /// Height of the subtree rooted at `start`, 1 for a bare node.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, start: Index) -> usize {
        if self.arena.get(start).is_none() {
            return 0;
        }
        1 + self
            .child_slice(start)
            .iter()
            .map(|&child| self.depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in the subtree rooted at `start`.
    #[instrument(level = "debug", skip(self))]
    pub fn node_count(&self, start: Index) -> usize {
        self.iter_from(start).count()
    }

    /// Labels of all terminal nodes of the subtree, left-to-right.
    ///
    /// A childless container counts as terminal here, same as a leaf.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_names(&self, start: Index) -> Vec<String> {
        let mut leaves = Vec::new();
        self.collect_leaves(start, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, idx: Index, leaves: &mut Vec<String>) {
        if let Some(node) = self.arena.get(idx) {
            let children = self.child_slice(idx);
            if children.is_empty() {
                leaves.push(node.name.clone());
            } else {
                for &child in children {
                    self.collect_leaves(child, leaves);
                }
            }
        }
    }

    /// Every path from `start` down to a terminal node, as node handles.
    #[instrument(level = "debug", skip(self))]
    pub fn branches(&self, start: Index) -> Vec<Vec<Index>> {
        let mut branches = Vec::new();
        let mut path = Vec::new();
        self.collect_branches(start, &mut path, &mut branches);
        branches
    }

    fn collect_branches(
        &self,
        idx: Index,
        path: &mut Vec<Index>,
        branches: &mut Vec<Vec<Index>>,
    ) {
        if self.arena.get(idx).is_none() {
            return;
        }
        path.push(idx);
        let children = self.child_slice(idx);
        if children.is_empty() {
            branches.push(path.clone());
        } else {
            for &child in children {
                self.collect_branches(child, path, branches);
            }
        }
        path.pop();
    }

    /// Branch paths rendered leaf-first, joined with " <- ".
    #[instrument(level = "debug", skip(self))]
    pub fn branch_lines(&self, start: Index) -> Vec<String> {
        self.branches(start)
            .into_iter()
            .map(|branch| {
                branch
                    .iter()
                    .rev()
                    .filter_map(|&idx| self.arena.get(idx).map(|n| n.name.as_str()))
                    .join(" <- ")
            })
            .collect()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a ComponentArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a ComponentArena, start: Index) -> Self {
        let mut stack = Vec::new();
        if arena.get_node(start).is_some() {
            stack.push(start);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a ComponentNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in self.arena.child_slice(current_idx).iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a ComponentArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a ComponentArena, start: Index) -> Self {
        let mut stack = Vec::new();
        if arena.get_node(start).is_some() {
            stack.push((start, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a ComponentNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in self.arena.child_slice(current_idx).iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

/// Pre-order line renderer, produced by [`ComponentArena::print_lines`].
pub struct PrintLines<'a> {
    arena: &'a ComponentArena,
    stack: Vec<(Index, usize)>,
    options: RenderOptions,
}

impl<'a> PrintLines<'a> {
    fn new(
        arena: &'a ComponentArena,
        start: Index,
        indent_level: usize,
        options: RenderOptions,
    ) -> Self {
        let mut stack = Vec::new();
        if arena.get_node(start).is_some() {
            stack.push((start, indent_level));
        }
        Self {
            arena,
            stack,
            options,
        }
    }
}

impl Iterator for PrintLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, level)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                for &child in self.arena.child_slice(current_idx).iter().rev() {
                    self.stack.push((child, level + 1));
                }
                return Some(format!(
                    "{}{}",
                    " ".repeat(self.options.indent * level),
                    node.name
                ));
            }
        }
        None
    }
}
