//! Domain layer: the task tree, its addressing and its notifications
//!
//! This layer is independent of external concerns (no I/O, no text formats, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod events;
pub mod path;
pub mod store;
pub mod transfer;

pub use arena::{NodeId, TaskArena, TaskNode};
pub use entities::{Field, FieldValue, TaskData, TaskSnapshot};
pub use error::{DomainError, DomainResult};
pub use events::{SubscriptionId, TreeEvent, TreeObserver};
pub use path::NodePath;
pub use store::{TaskStore, MAX_DEPTH};
pub use transfer::{accept_drop, DropAction, DropOutcome, EMPTY_PLACEHOLDER, TRANSFER_MIME};
