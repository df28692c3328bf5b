//! Change notifications emitted by the task store
//!
//! Structural mutations are announced as a bracket: an "about to" event
//! before the tree changes and a matching completion event afterwards, so
//! observers that keep their own row bookkeeping can adjust it in step.
//! Attribute writes are announced with a single point event.

use std::ops::Range;

use tracing::trace;

use crate::domain::arena::NodeId;
use crate::domain::entities::Field;

/// Notifications emitted by [`crate::domain::TaskStore`], in mutation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// One attribute of one node was written (also when the value is unchanged)
    AttributeChanged { node: NodeId, field: Field },

    RowsAboutToBeInserted { parent: NodeId, rows: Range<usize> },
    RowsInserted { parent: NodeId, rows: Range<usize> },

    RowsAboutToBeRemoved { parent: NodeId, rows: Range<usize> },
    RowsRemoved { parent: NodeId, rows: Range<usize> },

    /// `destination` is the requested position, counted before the move
    RowsAboutToBeMoved {
        source_parent: NodeId,
        rows: Range<usize>,
        destination_parent: NodeId,
        destination: usize,
    },
    RowsMoved {
        source_parent: NodeId,
        rows: Range<usize>,
        destination_parent: NodeId,
        destination: usize,
    },

    /// The whole tree is about to be replaced
    ResetAboutToBegin,
    Reset,
}

impl TreeEvent {
    /// True for the opening half of a bracket.
    pub fn is_begin(&self) -> bool {
        matches!(
            self,
            TreeEvent::RowsAboutToBeInserted { .. }
                | TreeEvent::RowsAboutToBeRemoved { .. }
                | TreeEvent::RowsAboutToBeMoved { .. }
                | TreeEvent::ResetAboutToBegin
        )
    }
}

/// Receiver of tree notifications.
pub trait TreeObserver {
    fn on_event(&mut self, event: &TreeEvent);
}

impl<F> TreeObserver for F
where
    F: FnMut(&TreeEvent),
{
    fn on_event(&mut self, event: &TreeEvent) {
        self(event)
    }
}

/// Token returned by [`ObserverRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscribed observers, notified in subscription order.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, Box<dyn TreeObserver>)>,
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ObserverRegistry {
    pub fn subscribe(&mut self, observer: Box<dyn TreeObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn emit(&mut self, event: &TreeEvent) {
        trace!("emit: {:?}", event);
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(event);
        }
    }

    /// Emits `begin` now and `end` when the returned guard drops.
    ///
    /// Open the bracket only after validation succeeded: a rejected call
    /// must emit neither half.
    pub fn bracket(&mut self, begin: TreeEvent, end: TreeEvent) -> Bracket<'_> {
        self.emit(&begin);
        Bracket {
            registry: self,
            end: Some(end),
        }
    }
}

/// Scope of one structural change; emits the closing event on drop.
pub struct Bracket<'a> {
    registry: &'a mut ObserverRegistry,
    end: Option<TreeEvent>,
}

impl Drop for Bracket<'_> {
    fn drop(&mut self) {
        if let Some(end) = self.end.take() {
            self.registry.emit(&end);
        }
    }
}
