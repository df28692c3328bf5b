//! Task document codec
//!
//! Document shape (field names are a wire contract):
//!
//! ```yaml
//! tasks:
//!   - description: A
//!     done: false
//!     expanded: true
//!     tasks:
//!       - description: A1
//!         done: true
//!         expanded: true
//! ```
//!
//! The root is a bare map holding only `tasks`, omitted when the tree is
//! empty. Every task carries all three attributes and a `tasks` key only
//! when it has children.
//!
//! Reading is tolerant: a missing or mistyped attribute keeps its default,
//! a missing or non-sequence `tasks` yields a leaf, non-map entries are
//! skipped, and a document that is not a map is an empty tree. Only text
//! that does not parse at all is rejected.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, instrument};

use crate::codec::error::{CodecError, CodecResult};
use crate::codec::{parse, scalar_text, untag};
use crate::domain::{TaskSnapshot, TaskStore, MAX_DEPTH};

const TASKS: &str = "tasks";
const DESCRIPTION: &str = "description";
const DONE: &str = "done";
const EXPANDED: &str = "expanded";

#[derive(Debug, Serialize)]
struct RootDocument<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tasks: Vec<TaskDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct TaskDocument<'a> {
    description: &'a str,
    done: bool,
    expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tasks: Vec<TaskDocument<'a>>,
}

impl<'a> From<&'a TaskSnapshot> for TaskDocument<'a> {
    fn from(task: &'a TaskSnapshot) -> Self {
        Self {
            description: &task.data.description,
            done: task.data.done,
            expanded: task.data.expanded,
            tasks: task.children.iter().map(TaskDocument::from).collect(),
        }
    }
}

/// Serializes top-level tasks, depth-first in child order.
///
/// Trees deeper than [`MAX_DEPTH`] are refused: the reader could not load them.
#[instrument(level = "debug", skip(tasks))]
pub fn serialize(tasks: &[TaskSnapshot]) -> CodecResult<String> {
    let depth = tasks.iter().map(TaskSnapshot::height).max().unwrap_or(0);
    if depth > MAX_DEPTH {
        return Err(CodecError::TooDeep {
            depth,
            max: MAX_DEPTH,
        });
    }
    let document = RootDocument {
        tasks: tasks.iter().map(TaskDocument::from).collect(),
    };
    serde_yaml::to_string(&document).map_err(CodecError::Emit)
}

/// Reconstructs top-level tasks from document text.
#[instrument(level = "debug", skip(text))]
pub fn deserialize(text: &str) -> CodecResult<Vec<TaskSnapshot>> {
    let document = parse(text)?;
    let tasks = match untag(&document) {
        Value::Mapping(root) => read_tasks(root),
        other => {
            debug!("deserialize: top level is not a map ({}), empty tree", kind(other));
            Vec::new()
        }
    };
    debug!("deserialize: {} top-level tasks", tasks.len());
    Ok(tasks)
}

/// Serializes the store's current tree.
pub fn encode(store: &TaskStore) -> CodecResult<String> {
    serialize(&store.snapshot())
}

/// Replaces the store's tree with the document's, in one reset.
///
/// Unparsable text leaves the store untouched.
pub fn decode_into(text: &str, store: &mut TaskStore) -> CodecResult<()> {
    let tasks = deserialize(text)?;
    store.reset_with(tasks);
    Ok(())
}

fn read_tasks(map: &Mapping) -> Vec<TaskSnapshot> {
    match map.get(TASKS).map(untag) {
        Some(Value::Sequence(items)) => items.iter().filter_map(read_task).collect(),
        _ => Vec::new(),
    }
}

fn read_task(value: &Value) -> Option<TaskSnapshot> {
    let Value::Mapping(map) = untag(value) else {
        debug!("read_task: skipping non-map entry ({})", kind(value));
        return None;
    };
    let mut task = TaskSnapshot::default();
    if let Some(description) = map.get(DESCRIPTION).and_then(scalar_text) {
        task.data.description = description;
    }
    if let Some(done) = map.get(DONE).and_then(read_flag) {
        task.data.done = done;
    }
    if let Some(expanded) = map.get(EXPANDED).and_then(read_flag) {
        task.data.expanded = expanded;
    }
    task.children = read_tasks(map);
    Some(task)
}

/// Booleans, including the YAML 1.1 spellings older files may carry.
fn read_flag(value: &Value) -> Option<bool> {
    match untag(value) {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" => Some(true),
            "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match untag(value) {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "map",
        Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn given_empty_tree_when_serializing_then_bare_empty_map() {
        let text = serialize(&[]).unwrap();
        assert_eq!(yaml(&text), Value::Mapping(Mapping::new()));
    }

    #[test]
    fn given_leaf_when_serializing_then_no_tasks_key() {
        let text = serialize(&[TaskSnapshot::new("leaf")]).unwrap();
        assert_eq!(
            yaml(&text),
            yaml("tasks: [{description: leaf, done: false, expanded: true}]")
        );
    }

    #[test]
    fn given_missing_attributes_when_deserializing_then_defaults() {
        let tasks = deserialize("tasks: [{description: only}, {}]").unwrap();
        assert_eq!(tasks, vec![TaskSnapshot::new("only"), TaskSnapshot::new("")]);
    }

    #[test]
    fn given_mistyped_attributes_when_deserializing_then_defaults_or_coerces() {
        let tasks =
            deserialize("tasks: [{description: 42, done: [1], expanded: no}]").unwrap();
        assert_eq!(tasks, vec![TaskSnapshot::new("42").expanded(false)]);
    }

    #[test]
    fn given_several_documents_when_deserializing_then_first_is_read() {
        let tasks = deserialize("tasks: [{description: a}]\n---\nfoo: 1\n").unwrap();
        assert_eq!(tasks, vec![TaskSnapshot::new("a")]);
    }

    #[test]
    fn given_leading_document_marker_when_deserializing_then_read() {
        let tasks = deserialize("---\ntasks: [{description: a}]\n").unwrap();
        assert_eq!(tasks, vec![TaskSnapshot::new("a")]);
    }

    #[test]
    fn given_non_map_entries_when_deserializing_then_skipped() {
        let tasks = deserialize("tasks: [~, plain, {description: kept}, [1, 2]]").unwrap();
        assert_eq!(tasks, vec![TaskSnapshot::new("kept")]);
    }
}
