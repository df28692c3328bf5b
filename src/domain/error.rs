//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;
use crate::domain::path::NodePath;

/// Domain errors represent rejected tree operations.
/// Every one of them is raised before the tree is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("index out of range: position {position}, count {count}, children {len}")]
    IndexOutOfRange {
        position: usize,
        count: usize,
        len: usize,
    },

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("no node at path: {0}")]
    PathNotFound(NodePath),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {field} expects a {expected} value")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("root node has no attributes")]
    RootAttribute,

    #[error("tree too deep: {depth} levels, at most {max} allowed")]
    TooDeep { depth: usize, max: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
