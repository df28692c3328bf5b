//! Drag and drop transfer contract for presentation layers
//!
//! Dragging out produces plain text of the displayed descriptions. Dropping
//! in never restructures the tree: row moves go through
//! [`TaskStore::move_nodes`](crate::domain::TaskStore::move_nodes).

use itertools::Itertools;
use tracing::trace;

use crate::domain::arena::NodeId;
use crate::domain::store::TaskStore;

/// The only transfer format offered or recognised.
pub const TRANSFER_MIME: &str = "text/plain";

/// Shown instead of an empty description.
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    Ignore,
    Copy,
    Move,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing to do, reported as handled
    Ignored,
    Rejected,
}

/// Decides what happens to data dropped onto the tree.
///
/// Pasted text carries no structure to rebuild rows from, so every real
/// drop is refused whatever its format, action or column.
pub fn accept_drop(mime: &str, action: DropAction, column: usize) -> DropOutcome {
    if action == DropAction::Ignore {
        return DropOutcome::Ignored;
    }
    trace!("drop rejected: mime={} action={:?} column={}", mime, action, column);
    DropOutcome::Rejected
}

impl TaskStore {
    /// Display text: the description, or a placeholder when it is empty.
    pub fn display_text(&self, node: NodeId) -> Option<String> {
        let data = self.data(node)?;
        if data.description.is_empty() {
            Some(EMPTY_PLACEHOLDER.to_string())
        } else {
            Some(data.description.clone())
        }
    }

    /// Plain-text transfer payload, one display text per line.
    /// Stale handles and the root are skipped.
    pub fn transfer_text(&self, nodes: &[NodeId]) -> String {
        nodes
            .iter()
            .filter_map(|&node| self.display_text(node))
            .join("\n")
    }
}
