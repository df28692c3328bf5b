//! Hierarchical task list store with a YAML codec.
//!
//! The [`domain`] layer owns the tree and its change notifications, [`codec`]
//! converts between trees and YAML text, and [`application`] reads and writes
//! documents on disk.

pub mod application;
pub mod cli;
pub mod codec;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, ApplicationResult};
pub use codec::{CodecError, CodecResult};
pub use domain::{DomainError, DomainResult, NodeId, NodePath, TaskData, TaskSnapshot, TaskStore};
