//! Task store: owning, index-addressed mutation API over the task hierarchy
//!
//! Every operation validates first and mutates second. A rejected call leaves
//! the tree untouched and emits no notification; an accepted structural call
//! is wrapped in exactly one begin/end bracket (see [`TreeEvent`]).

use std::ops::Range;

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, TaskArena, TaskNode, TreeIterator};
use crate::domain::entities::{Field, FieldValue, TaskData, TaskSnapshot};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::{ObserverRegistry, SubscriptionId, TreeEvent, TreeObserver};
use crate::domain::path::NodePath;

/// Deepest task level the store accepts; top-level tasks are level 1.
///
/// The YAML reader refuses nesting much past this, so a deeper tree could
/// be saved but never loaded again.
pub const MAX_DEPTH: usize = 60;

/// Owner of the task tree and single writer of its structure.
///
/// Parent arguments are `Option<NodeId>`: `None` addresses the root.
#[derive(Debug, Default)]
pub struct TaskStore {
    tree: TaskArena,
    observers: ObserverRegistry,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn subscribe(&mut self, observer: impl TreeObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ------------------------------------------------------------
    // Addressing
    // ------------------------------------------------------------

    fn resolve(&self, parent: Option<NodeId>) -> DomainResult<NodeId> {
        match parent {
            None => Ok(self.tree.root()),
            Some(id) if self.tree.contains(id) => Ok(id),
            Some(id) => Err(DomainError::NodeNotFound(id)),
        }
    }

    /// Number of direct children; a stale handle has none.
    pub fn child_count(&self, parent: Option<NodeId>) -> usize {
        self.tree.children(parent.unwrap_or(self.tree.root())).len()
    }

    pub fn node_at(&self, parent: Option<NodeId>, position: usize) -> DomainResult<NodeId> {
        let parent = self.resolve(parent)?;
        let children = self.tree.children(parent);
        children
            .get(position)
            .copied()
            .ok_or(DomainError::IndexOutOfRange {
                position,
                count: 1,
                len: children.len(),
            })
    }

    /// Parent of `node`; None for the root and for removed nodes.
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.tree.get_node(node).and_then(TaskNode::parent)
    }

    /// Index of `node` among its siblings.
    ///
    /// None means detached: the handle was removed, or it is the root,
    /// which has no siblings.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.tree.position_of(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.contains(node)
    }

    pub fn children(&self, parent: Option<NodeId>) -> &[NodeId] {
        self.tree.children(parent.unwrap_or(self.tree.root()))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node_at_path(&self, path: &NodePath) -> DomainResult<NodeId> {
        let mut current = self.tree.root();
        for &position in path.positions() {
            current = self
                .tree
                .children(current)
                .get(position)
                .copied()
                .ok_or_else(|| DomainError::PathNotFound(path.clone()))?;
        }
        Ok(current)
    }

    /// Walks parent links up to the root. None for removed nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn path_of(&self, node: NodeId) -> Option<NodePath> {
        let mut positions = Vec::new();
        let mut cursor = self.tree.get_node(node)?;
        let mut current = node;
        while let Some(parent) = cursor.parent() {
            positions.push(self.tree.position_of(current)?);
            current = parent;
            cursor = self.tree.get_node(parent)?;
        }
        positions.reverse();
        Some(NodePath::new(positions))
    }

    // ------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------

    pub fn data(&self, node: NodeId) -> Option<&TaskData> {
        if node == self.tree.root() {
            return None;
        }
        self.tree.get_node(node).map(|n| &n.data)
    }

    pub fn get(&self, node: NodeId, field: Field) -> DomainResult<FieldValue> {
        if node == self.tree.root() {
            return Err(DomainError::RootAttribute);
        }
        self.tree
            .get_node(node)
            .map(|n| n.data.get(field))
            .ok_or(DomainError::NodeNotFound(node))
    }

    /// Writes one attribute and announces it, even when the value is unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn set(&mut self, node: NodeId, field: Field, value: FieldValue) -> DomainResult<()> {
        if node == self.tree.root() {
            return Err(DomainError::RootAttribute);
        }
        let target = self
            .tree
            .get_node_mut(node)
            .ok_or(DomainError::NodeNotFound(node))?;
        target.data.set(field, value)?;
        debug!("set: node={} field={}", node, field);
        self.observers
            .emit(&TreeEvent::AttributeChanged { node, field });
        Ok(())
    }

    pub fn set_description(&mut self, node: NodeId, description: impl Into<String>) -> DomainResult<()> {
        self.set(node, Field::Description, FieldValue::Text(description.into()))
    }

    pub fn set_done(&mut self, node: NodeId, done: bool) -> DomainResult<()> {
        self.set(node, Field::Done, FieldValue::Flag(done))
    }

    pub fn set_expanded(&mut self, node: NodeId, expanded: bool) -> DomainResult<()> {
        self.set(node, Field::Expanded, FieldValue::Flag(expanded))
    }

    /// Re-announces every field of `node` without changing it.
    pub fn touch(&mut self, node: NodeId) -> DomainResult<()> {
        if node == self.tree.root() {
            return Err(DomainError::RootAttribute);
        }
        if !self.tree.contains(node) {
            return Err(DomainError::NodeNotFound(node));
        }
        for field in Field::ALL {
            self.observers
                .emit(&TreeEvent::AttributeChanged { node, field });
        }
        Ok(())
    }

    // ------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------

    /// Inserts `count` empty tasks at `position` (equal to the child count appends).
    #[instrument(level = "debug", skip(self))]
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        position: usize,
        count: usize,
    ) -> DomainResult<Vec<NodeId>> {
        let parent = self.resolve(parent)?;
        let len = self.tree.children(parent).len();
        if position > len {
            return Err(DomainError::IndexOutOfRange {
                position,
                count,
                len,
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        let end = position
            .checked_add(count)
            .ok_or(DomainError::IndexOutOfRange {
                position,
                count,
                len,
            })?;
        let depth = self.tree.level_of(parent) + 1;
        if depth > MAX_DEPTH {
            return Err(DomainError::TooDeep {
                depth,
                max: MAX_DEPTH,
            });
        }

        let rows = position..end;
        let _bracket = self.observers.bracket(
            TreeEvent::RowsAboutToBeInserted {
                parent,
                rows: rows.clone(),
            },
            TreeEvent::RowsInserted {
                parent,
                rows: rows.clone(),
            },
        );
        let created = rows
            .map(|at| self.tree.attach_new(parent, at, TaskData::default()))
            .collect();
        debug!("insert: parent={} position={} count={}", parent, position, count);
        Ok(created)
    }

    /// Removes `count` tasks starting at `position`, destroying their subtrees.
    ///
    /// Returns the number of destroyed nodes, descendants included.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(
        &mut self,
        parent: Option<NodeId>,
        position: usize,
        count: usize,
    ) -> DomainResult<usize> {
        let parent = self.resolve(parent)?;
        let rows = self.checked_rows(parent, position, count)?;
        if count == 0 {
            return Ok(0);
        }

        let doomed = self.tree.children(parent)[rows.clone()].to_vec();
        let _bracket = self.observers.bracket(
            TreeEvent::RowsAboutToBeRemoved {
                parent,
                rows: rows.clone(),
            },
            TreeEvent::RowsRemoved { parent, rows },
        );
        let destroyed: usize = doomed
            .into_iter()
            .map(|node| self.tree.remove_subtree(node))
            .sum();
        debug!(
            "remove: parent={} position={} count={} destroyed={}",
            parent, position, count, destroyed
        );
        Ok(destroyed)
    }

    /// Relocates a run of `count` siblings, keeping their order and subtrees.
    ///
    /// `to_position` is counted in the destination's children before the move.
    /// Within one parent the result equals taking the run out and inserting it
    /// where `to_position` points afterwards; a target inside or adjacent to the
    /// run therefore leaves the order unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn move_nodes(
        &mut self,
        from_parent: Option<NodeId>,
        from_position: usize,
        count: usize,
        to_parent: Option<NodeId>,
        to_position: usize,
    ) -> DomainResult<()> {
        let source = self.resolve(from_parent)?;
        let destination = self.resolve(to_parent)?;
        let rows = self.checked_rows(source, from_position, count)?;

        let destination_len = self.tree.children(destination).len();
        if to_position > destination_len {
            return Err(DomainError::IndexOutOfRange {
                position: to_position,
                count,
                len: destination_len,
            });
        }

        let run = &self.tree.children(source)[rows.clone()];
        if let Some(&offender) = run
            .iter()
            .find(|&&moved| self.tree.is_ancestor_or_self(moved, destination))
        {
            return Err(DomainError::InvalidMove(format!(
                "destination {} lies inside moved node {}",
                destination, offender
            )));
        }
        let depth = self.tree.level_of(destination)
            + run
                .iter()
                .map(|&moved| self.tree.height(moved))
                .max()
                .unwrap_or(0);
        if depth > MAX_DEPTH {
            return Err(DomainError::TooDeep {
                depth,
                max: MAX_DEPTH,
            });
        }

        let target = if source == destination {
            collapse_position(to_position, &rows)
        } else {
            to_position
        };
        if count == 0 || (source == destination && target == from_position) {
            debug!("move: no structural change");
            return Ok(());
        }

        let _bracket = self.observers.bracket(
            TreeEvent::RowsAboutToBeMoved {
                source_parent: source,
                rows: rows.clone(),
                destination_parent: destination,
                destination: to_position,
            },
            TreeEvent::RowsMoved {
                source_parent: source,
                rows,
                destination_parent: destination,
                destination: to_position,
            },
        );
        self.tree
            .relocate(source, from_position, count, destination, target);
        debug!(
            "move: {}[{}..+{}] -> {}[{}]",
            source, from_position, count, destination, to_position
        );
        Ok(())
    }

    /// Removes every top-level task.
    pub fn clear(&mut self) -> DomainResult<usize> {
        let count = self.child_count(None);
        self.remove(None, 0, count)
    }

    fn checked_rows(
        &self,
        parent: NodeId,
        position: usize,
        count: usize,
    ) -> DomainResult<Range<usize>> {
        let len = self.tree.children(parent).len();
        match position.checked_add(count) {
            Some(end) if end <= len => Ok(position..end),
            _ => Err(DomainError::IndexOutOfRange {
                position,
                count,
                len,
            }),
        }
    }

    // ------------------------------------------------------------
    // Whole-tree access
    // ------------------------------------------------------------

    /// Number of tasks, the root excluded.
    pub fn node_count(&self) -> usize {
        self.tree.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    /// Pre-order traversal of all tasks, the root excluded.
    pub fn iter(&self) -> std::iter::Skip<TreeIterator<'_>> {
        self.tree.iter().skip(1)
    }

    /// Value copy of all top-level tasks and their subtrees.
    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.tree
            .children(self.tree.root())
            .iter()
            .filter_map(|&child| self.subtree(child))
            .collect()
    }

    pub fn subtree(&self, node: NodeId) -> Option<TaskSnapshot> {
        let entry = self.tree.get_node(node)?;
        Some(TaskSnapshot {
            data: entry.data.clone(),
            children: entry
                .children()
                .iter()
                .filter_map(|&child| self.subtree(child))
                .collect(),
        })
    }

    /// Replaces the whole tree inside a single reset bracket.
    #[instrument(level = "debug", skip(self, tasks))]
    pub fn reset_with(&mut self, tasks: Vec<TaskSnapshot>) {
        let _bracket = self
            .observers
            .bracket(TreeEvent::ResetAboutToBegin, TreeEvent::Reset);
        let root = self.tree.root();
        let top_level = self.tree.children(root).to_vec();
        for node in top_level {
            self.tree.remove_subtree(node);
        }
        let mut stack: Vec<(NodeId, Vec<TaskSnapshot>)> = vec![(root, tasks)];
        while let Some((parent, batch)) = stack.pop() {
            for (position, task) in batch.into_iter().enumerate() {
                let id = self.tree.attach_new(parent, position, task.data);
                if !task.children.is_empty() {
                    stack.push((id, task.children));
                }
            }
        }
        debug!("reset: {} tasks", self.tree.len() - 1);
    }
}

/// Maps a pre-move destination to the index it denotes once the run is out.
fn collapse_position(to_position: usize, rows: &Range<usize>) -> usize {
    if to_position <= rows.start {
        to_position
    } else if to_position < rows.end {
        rows.start
    } else {
        to_position - rows.len()
    }
}
