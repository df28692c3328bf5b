//! Position paths from just below the root down to a node

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::domain::error::DomainError;

/// Ordered child positions leading from the root to a node.
///
/// A path is only meaningful against the tree shape it was taken from;
/// structural changes in front of any of its positions invalidate it.
/// The empty path addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(positions: Vec<usize>) -> Self {
        Self(positions)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn positions(&self) -> &[usize] {
        &self.0
    }

    /// Path of the parent; None for the root path.
    pub fn parent(&self) -> Option<NodePath> {
        let (_, init) = self.0.split_last()?;
        Some(NodePath(init.to_vec()))
    }

    /// Position within the parent; None for the root path.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn child(&self, position: usize) -> NodePath {
        let mut positions = self.0.clone();
        positions.push(position);
        NodePath(positions)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(positions: Vec<usize>) -> Self {
        Self(positions)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        write!(f, "{}", self.0.iter().join("."))
    }
}

impl FromStr for NodePath {
    type Err = DomainError;

    /// Parses `0.2.1`; `/` or an empty string is the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(NodePath::root());
        }
        trimmed
            .split('.')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| DomainError::InvalidPath(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(NodePath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", vec![])]
    #[case("/", vec![])]
    #[case("3", vec![3])]
    #[case("0.2.1", vec![0, 2, 1])]
    fn given_valid_text_when_parsing_then_returns_positions(
        #[case] text: &str,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(text.parse::<NodePath>().unwrap(), NodePath::new(expected));
    }

    #[rstest]
    #[case("a")]
    #[case("1..2")]
    #[case("-1")]
    fn given_invalid_text_when_parsing_then_errors(#[case] text: &str) {
        assert!(matches!(
            text.parse::<NodePath>(),
            Err(DomainError::InvalidPath(_))
        ));
    }

    #[test]
    fn given_path_when_displayed_then_round_trips() {
        let path = NodePath::new(vec![1, 0, 4]);
        assert_eq!(path.to_string(), "1.0.4");
        assert_eq!(path.to_string().parse::<NodePath>().unwrap(), path);
        assert_eq!(NodePath::root().to_string(), "/");
    }

    #[test]
    fn given_nested_path_when_splitting_then_parent_and_last() {
        let path = NodePath::new(vec![1, 0, 4]);
        assert_eq!(path.parent(), Some(NodePath::new(vec![1, 0])));
        assert_eq!(path.last(), Some(4));
        assert_eq!(NodePath::root().parent(), None);
        assert_eq!(NodePath::root().child(2), NodePath::new(vec![2]));
    }
}
