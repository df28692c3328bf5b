//! Text codecs sharing one YAML grammar
//!
//! - [`tree`]: task hierarchy ⇄ nested task document
//! - [`flat`]: string-keyed values ⇄ single flat map

pub mod error;
pub mod flat;
pub mod tree;

use serde::Deserialize;
use serde_yaml::{Deserializer, Value};

pub use error::{CodecError, CodecResult};
pub use flat::{deserialize_flat, serialize_flat, FlatMap, FlatValue};
pub use tree::{decode_into, deserialize, encode, serialize};

/// Parses the first document of `text` into a YAML value.
///
/// Blank input is an empty (null) document. Documents after the first are
/// ignored.
fn parse(text: &str) -> CodecResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match Deserializer::from_str(text).next() {
        Some(document) => Value::deserialize(document).map_err(CodecError::MalformedDocument),
        None => Ok(Value::Null),
    }
}

/// Looks through YAML tags (`!foo value`) to the tagged value.
fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Text form of a scalar; None for null and for collections.
fn scalar_text(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
