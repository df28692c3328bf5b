//! Domain entities: task payload, field addressing and owned snapshots

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Attributes carried by every non-root task node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskData {
    pub description: String,
    pub done: bool,
    /// Presentation hint, persisted nonetheless
    pub expanded: bool,
}

impl Default for TaskData {
    fn default() -> Self {
        Self {
            description: String::new(),
            done: false,
            expanded: true,
        }
    }
}

/// Closed set of addressable task attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Description,
    Done,
    Expanded,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Description, Field::Done, Field::Expanded];

    /// Wire name of the field, as used in task documents.
    pub fn name(self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::Done => "done",
            Field::Expanded => "expanded",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "description" => Ok(Field::Description),
            "done" => Ok(Field::Done),
            "expanded" => Ok(Field::Expanded),
            other => Err(DomainError::UnknownField(other.to_string())),
        }
    }
}

/// Dynamically typed attribute value for field-addressed access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Parse a textual value into the kind `field` expects.
    pub fn parse_for(field: Field, raw: &str) -> Result<Self, DomainError> {
        match field {
            Field::Description => Ok(FieldValue::Text(raw.to_string())),
            Field::Done | Field::Expanded => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(FieldValue::Flag(true)),
                "false" | "no" | "off" | "0" => Ok(FieldValue::Flag(false)),
                _ => Err(DomainError::TypeMismatch {
                    field: field.name(),
                    expected: "boolean",
                }),
            },
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl TaskData {
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Description => FieldValue::Text(self.description.clone()),
            Field::Done => FieldValue::Flag(self.done),
            Field::Expanded => FieldValue::Flag(self.expanded),
        }
    }

    /// Writes `value` into `field`, rejecting a value of the wrong kind.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), DomainError> {
        match (field, value) {
            (Field::Description, FieldValue::Text(text)) => self.description = text,
            (Field::Done, FieldValue::Flag(flag)) => self.done = flag,
            (Field::Expanded, FieldValue::Flag(flag)) => self.expanded = flag,
            (Field::Description, _) => {
                return Err(DomainError::TypeMismatch {
                    field: field.name(),
                    expected: "text",
                })
            }
            (_, _) => {
                return Err(DomainError::TypeMismatch {
                    field: field.name(),
                    expected: "boolean",
                })
            }
        }
        Ok(())
    }
}

/// Owned value copy of a task and its whole subtree.
///
/// Comparing two snapshots compares attributes and child order at every level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub data: TaskData,
    pub children: Vec<TaskSnapshot>,
}

impl Default for TaskSnapshot {
    fn default() -> Self {
        Self::new("")
    }
}

impl TaskSnapshot {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            data: TaskData {
                description: description.into(),
                ..TaskData::default()
            },
            children: Vec::new(),
        }
    }

    pub fn done(mut self, done: bool) -> Self {
        self.data.done = done;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.data.expanded = expanded;
        self
    }

    pub fn with_children(mut self, children: Vec<TaskSnapshot>) -> Self {
        self.children = children;
        self
    }

    /// Levels in this subtree, itself included.
    pub fn height(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TaskSnapshot::height)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TaskSnapshot::count).sum::<usize>()
    }
}
