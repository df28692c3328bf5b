use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::entities::TaskData;

/// Opaque handle to a task node.
///
/// Handles are generational: once a node is removed its handle never
/// resolves again, even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{slot}@{generation}")
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TaskNode {
    /// Task attributes, unused for the root
    pub data: TaskData,
    /// Non-owning back reference, None for the root and for detached nodes
    parent: Option<NodeId>,
    /// Owned children in display order
    children: Vec<NodeId>,
}

impl TaskNode {
    fn new(data: TaskData, parent: Option<NodeId>) -> Self {
        Self {
            data,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-based storage for one task hierarchy.
///
/// The root always exists. Only the structural methods below write the
/// `parent`/`children` links, which keeps both sides consistent.
#[derive(Debug)]
pub struct TaskArena {
    arena: Arena<TaskNode>,
    root: NodeId,
}

impl Default for TaskArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskArena {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(TaskNode::new(TaskData::default(), None)));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, id: NodeId) -> Option<&TaskNode> {
        self.arena.get(id.0)
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TaskNode> {
        self.arena.get_mut(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Children of `id`; empty for stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(TaskNode::children).unwrap_or(&[])
    }

    /// Index of `id` within its parent's children, None for root or stale handles.
    #[instrument(level = "trace", skip(self))]
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.get_node(id)?.parent?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// True if `ancestor` is `node` or lies on the path from `node` to the root.
    #[instrument(level = "trace", skip(self))]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.get_node(current).and_then(TaskNode::parent);
        }
        false
    }

    /// Creates a node under `parent` at `position`. Bounds are the caller's concern.
    #[instrument(level = "trace", skip(self, data))]
    pub(crate) fn attach_new(&mut self, parent: NodeId, position: usize, data: TaskData) -> NodeId {
        let id = NodeId(self.arena.insert(TaskNode::new(data, Some(parent))));
        if let Some(node) = self.get_node_mut(parent) {
            node.children.insert(position, id);
        }
        id
    }

    /// Destroys `id` and its whole subtree. Returns the number of freed nodes.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> usize {
        if let Some(parent) = self.get_node(id).and_then(TaskNode::parent) {
            if let Some(node) = self.get_node_mut(parent) {
                node.children.retain(|&child| child != id);
            }
        }
        let doomed: Vec<NodeId> = self.iter_postorder_from(id).map(|(idx, _)| idx).collect();
        for idx in &doomed {
            self.arena.remove(idx.0);
        }
        doomed.len()
    }

    /// Detaches `count` children of `source` starting at `first` and splices
    /// them into `destination` at `position`, keeping their order.
    ///
    /// `position` is expressed in the destination's coordinates after the run
    /// was taken out.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn relocate(
        &mut self,
        source: NodeId,
        first: usize,
        count: usize,
        destination: NodeId,
        position: usize,
    ) {
        let run: Vec<NodeId> = match self.get_node_mut(source) {
            Some(node) => node.children.drain(first..first + count).collect(),
            None => return,
        };
        for &moved in &run {
            if let Some(node) = self.get_node_mut(moved) {
                node.parent = Some(destination);
            }
        }
        if let Some(node) = self.get_node_mut(destination) {
            node.children.splice(position..position, run);
        }
    }

    /// Pre-order traversal from the root, root included.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `start`.
    pub fn iter_from(&self, start: NodeId) -> TreeIterator {
        TreeIterator::new(self, start)
    }

    /// Post-order traversal of the subtree rooted at `start`.
    pub fn iter_postorder_from(&self, start: NodeId) -> PostOrderIterator {
        PostOrderIterator::new(self, start)
    }

    /// Number of edges from the root to `id`: 0 for the root, 1 for top-level tasks.
    pub fn level_of(&self, id: NodeId) -> usize {
        let mut level = 0;
        let mut cursor = self.get_node(id).and_then(TaskNode::parent);
        while let Some(parent) = cursor {
            level += 1;
            cursor = self.get_node(parent).and_then(TaskNode::parent);
        }
        level
    }

    /// Levels in the subtree rooted at `id`, itself included.
    pub fn height(&self, id: NodeId) -> usize {
        self.calculate_depth(id)
    }

    /// Levels below the root; an empty tree has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root) - 1
    }

    #[instrument(level = "trace", skip(self))]
    fn calculate_depth(&self, node_idx: NodeId) -> usize {
        1 + self
            .children(node_idx)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TaskArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TaskArena, start: NodeId) -> Self {
        let stack = if arena.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TaskNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TaskArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TaskArena, start: NodeId) -> Self {
        let stack = if arena.contains(start) {
            vec![(start, false)]
        } else {
            Vec::new()
        };
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TaskNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn task(description: &str) -> TaskData {
        TaskData {
            description: description.to_string(),
            ..TaskData::default()
        }
    }

    #[test]
    fn given_new_arena_when_created_then_root_exists_without_children() {
        let arena = TaskArena::new();
        assert!(arena.contains(arena.root()));
        assert!(arena.is_empty());
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.depth(), 0);
        assert_eq!(arena.position_of(arena.root()), None);
    }

    #[test]
    fn given_nested_nodes_when_iterating_then_visits_pre_and_post_order() {
        let mut arena = TaskArena::new();
        let root = arena.root();
        let a = arena.attach_new(root, 0, task("a"));
        arena.attach_new(a, 0, task("a1"));
        arena.attach_new(root, 1, task("b"));

        let pre: Vec<_> = arena
            .iter()
            .skip(1)
            .map(|(_, n)| n.data.description.clone())
            .collect();
        assert_eq!(pre, vec!["a", "a1", "b"]);

        let post: Vec<_> = arena
            .iter_postorder_from(root)
            .map(|(_, n)| n.data.description.clone())
            .collect();
        assert_eq!(post, vec!["a1", "a", "b", ""]);
        assert_eq!(arena.depth(), 2);
    }

    #[test]
    fn given_chain_when_measuring_then_level_and_height_count_from_each_end() {
        let mut arena = TaskArena::new();
        let root = arena.root();
        let a = arena.attach_new(root, 0, task("a"));
        let a1 = arena.attach_new(a, 0, task("a1"));
        let a2 = arena.attach_new(a1, 0, task("a2"));

        assert_eq!(arena.level_of(root), 0);
        assert_eq!(arena.level_of(a2), 3);
        assert_eq!(arena.height(a), 3);
        assert_eq!(arena.height(a2), 1);
    }

    #[test]
    fn given_removed_subtree_when_looking_up_then_handles_are_stale() {
        let mut arena = TaskArena::new();
        let root = arena.root();
        let a = arena.attach_new(root, 0, task("a"));
        let a1 = arena.attach_new(a, 0, task("a1"));

        assert_eq!(arena.remove_subtree(a), 2);
        assert!(!arena.contains(a));
        assert!(!arena.contains(a1));
        assert!(arena.is_empty());

        // A reused slot must not revive the old handle
        let b = arena.attach_new(root, 0, task("b"));
        assert_ne!(a, b);
        assert!(arena.get_node(a).is_none());
    }

    #[test]
    fn given_chain_when_checking_ancestry_then_follows_parent_links() {
        let mut arena = TaskArena::new();
        let root = arena.root();
        let a = arena.attach_new(root, 0, task("a"));
        let a1 = arena.attach_new(a, 0, task("a1"));
        let b = arena.attach_new(root, 1, task("b"));

        assert!(arena.is_ancestor_or_self(a, a1));
        assert!(arena.is_ancestor_or_self(a, a));
        assert!(!arena.is_ancestor_or_self(a, b));
        assert!(!arena.is_ancestor_or_self(a1, a));
    }
}
