//! Flat key/value document codec
//!
//! Writes text, bytes (as lowercase hex) and text lists; any other value kind
//! is written as a `(wrong type <kind>)` placeholder instead of failing.
//! Reading infers the kind from shape only: scalars come back as text and
//! sequences as text lists. Bytes are therefore read back as their hex text;
//! use [`FlatValue::hex_bytes`] to recover them.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};
use tracing::{debug, instrument};

use crate::codec::error::{CodecError, CodecResult};
use crate::codec::{parse, scalar_text, untag};

/// Keys are kept sorted so output is deterministic.
pub type FlatMap = BTreeMap<String, FlatValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatValue {
    Text(String),
    Bytes(Vec<u8>),
    TextList(Vec<String>),
    Integer(i64),
    Bool(bool),
}

impl FlatValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FlatValue::Text(_) => "text",
            FlatValue::Bytes(_) => "bytes",
            FlatValue::TextList(_) => "list",
            FlatValue::Integer(_) => "integer",
            FlatValue::Bool(_) => "bool",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FlatValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Decodes a text value written from bytes. None if it is not hex text.
    pub fn hex_bytes(&self) -> Option<Vec<u8>> {
        match self {
            FlatValue::Text(text) => hex::decode(text).ok(),
            FlatValue::Bytes(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    fn to_yaml(&self) -> Value {
        match self {
            FlatValue::Text(text) => Value::String(text.clone()),
            FlatValue::Bytes(bytes) => Value::String(hex::encode(bytes)),
            FlatValue::TextList(items) => {
                Value::Sequence(items.iter().cloned().map(Value::String).collect())
            }
            other => Value::String(format!("(wrong type {})", other.kind())),
        }
    }
}

#[instrument(level = "debug", skip(values))]
pub fn serialize_flat(values: &FlatMap) -> CodecResult<String> {
    let mut document = Mapping::new();
    for (key, value) in values {
        document.insert(Value::String(key.clone()), value.to_yaml());
    }
    serde_yaml::to_string(&document).map_err(CodecError::Emit)
}

/// Null values, nested maps and non-scalar keys are skipped; non-scalar
/// list items are dropped from their list.
#[instrument(level = "debug", skip(text))]
pub fn deserialize_flat(text: &str) -> CodecResult<FlatMap> {
    let document = parse(text)?;
    let mut values = FlatMap::new();
    let Value::Mapping(entries) = untag(&document) else {
        return Ok(values);
    };
    for (key, value) in entries {
        let Some(key) = scalar_text(key) else {
            continue;
        };
        let value = match untag(value) {
            Value::Sequence(items) => {
                FlatValue::TextList(items.iter().filter_map(scalar_text).collect())
            }
            scalar => match scalar_text(scalar) {
                Some(text) => FlatValue::Text(text),
                None => {
                    debug!("deserialize_flat: skipping {}", key);
                    continue;
                }
            },
        };
        values.insert(key, value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn given_supported_kinds_when_serializing_then_flat_map() {
        let mut values = FlatMap::new();
        values.insert("name".into(), FlatValue::Text("inbox".into()));
        values.insert("geometry".into(), FlatValue::Bytes(vec![0x01, 0xab, 0xff]));
        values.insert(
            "recent".into(),
            FlatValue::TextList(vec!["a.yaml".into(), "b.yaml".into()]),
        );

        let text = serialize_flat(&values).unwrap();

        assert_eq!(
            yaml(&text),
            yaml("{geometry: 01abff, name: inbox, recent: [a.yaml, b.yaml]}")
        );
    }

    #[test]
    fn given_other_kinds_when_serializing_then_placeholder() {
        let mut values = FlatMap::new();
        values.insert("count".into(), FlatValue::Integer(3));
        values.insert("flag".into(), FlatValue::Bool(true));

        let text = serialize_flat(&values).unwrap();

        assert_eq!(
            yaml(&text),
            yaml("{count: '(wrong type integer)', flag: '(wrong type bool)'}")
        );
    }

    #[test]
    fn given_bytes_when_round_tripping_then_text_needs_hex_decoding() {
        let mut values = FlatMap::new();
        values.insert("state".into(), FlatValue::Bytes(vec![0, 1, 2, 250]));

        let back = deserialize_flat(&serialize_flat(&values).unwrap()).unwrap();

        assert_eq!(back["state"], FlatValue::Text("000102fa".into()));
        assert_eq!(back["state"].hex_bytes(), Some(vec![0, 1, 2, 250]));
    }

    #[test]
    fn given_mixed_shapes_when_deserializing_then_infers_text_and_lists() {
        let values = deserialize_flat(
            "a: hello\nb: 12\nc: [x, 3, {nested: map}]\nd: ~\ne: {nested: map}\n",
        )
        .unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(values["a"], FlatValue::Text("hello".into()));
        assert_eq!(values["b"], FlatValue::Text("12".into()));
        assert_eq!(
            values["c"],
            FlatValue::TextList(vec!["x".into(), "3".into()])
        );
    }

    #[test]
    fn given_non_map_document_when_deserializing_then_empty() {
        assert!(deserialize_flat("- just\n- a list\n").unwrap().is_empty());
        assert!(deserialize_flat("").unwrap().is_empty());
    }

    #[test]
    fn given_lexically_invalid_text_when_deserializing_then_malformed() {
        let result = deserialize_flat("key: [unclosed");
        assert!(matches!(result, Err(CodecError::MalformedDocument(_))));
    }
}
