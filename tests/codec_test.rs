//! Document codec tests against the task list wire format

use rstest::rstest;
use serde_yaml::Value;

use tasktree::codec::{self, CodecError, FlatMap, FlatValue};
use tasktree::domain::{TaskSnapshot, TaskStore, TreeEvent, MAX_DEPTH};
use tasktree::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

fn scenario() -> Vec<TaskSnapshot> {
    vec![
        TaskSnapshot::new("A").with_children(vec![TaskSnapshot::new("A1").done(true)]),
        TaskSnapshot::new("B"),
    ]
}

/// Single path of `depth` nested tasks.
fn chain(depth: usize) -> Vec<TaskSnapshot> {
    let mut task = TaskSnapshot::new(format!("level {depth}"));
    for level in (1..depth).rev() {
        task = TaskSnapshot::new(format!("level {level}")).with_children(vec![task]);
    }
    vec![task]
}

const SCENARIO_TEXT: &str = r#"
tasks:
  - description: A
    done: false
    expanded: true
    tasks:
      - description: A1
        done: true
        expanded: true
  - description: B
    done: false
    expanded: true
"#;

#[test]
fn given_two_level_tree_when_serializing_then_matches_document_shape() {
    let text = codec::serialize(&scenario()).unwrap();

    assert_eq!(yaml(&text), yaml(SCENARIO_TEXT));
}

#[test]
fn given_document_when_deserializing_then_reproduces_tree() {
    let tasks = codec::deserialize(SCENARIO_TEXT).unwrap();

    assert_eq!(tasks, scenario());
    assert_eq!(tasks.iter().map(TaskSnapshot::count).sum::<usize>(), 3);
}

#[test]
fn given_store_when_encoding_and_decoding_then_tree_equal() {
    let mut source = TaskStore::new();
    source.reset_with(scenario());
    let text = codec::encode(&source).unwrap();

    let mut target = TaskStore::new();
    codec::decode_into(&text, &mut target).unwrap();

    assert_eq!(target.snapshot(), source.snapshot());
}

#[rstest]
#[case::empty_tree(Vec::new())]
#[case::scenario(scenario())]
#[case::collapsed_at_several_depths(vec![
    TaskSnapshot::new("a").expanded(false).with_children(vec![
        TaskSnapshot::new("a1").with_children(vec![
            TaskSnapshot::new("a11").expanded(false).done(true),
        ]),
        TaskSnapshot::new("a2").expanded(false),
    ]),
    TaskSnapshot::new("b").expanded(false).done(true),
])]
#[case::empty_descriptions(vec![
    TaskSnapshot::new("").with_children(vec![TaskSnapshot::new("")]),
])]
#[case::descriptions_resembling_other_values(vec![
    TaskSnapshot::new("true"),
    TaskSnapshot::new("yes"),
    TaskSnapshot::new("~"),
    TaskSnapshot::new("null"),
    TaskSnapshot::new("1.50"),
    TaskSnapshot::new("a: b"),
    TaskSnapshot::new("- item"),
    TaskSnapshot::new("# not a comment"),
    TaskSnapshot::new(" padded "),
    TaskSnapshot::new("first line\nsecond line"),
])]
#[case::chain_at_depth_limit(chain(MAX_DEPTH))]
fn given_tree_when_serializing_and_deserializing_then_identical(
    #[case] tasks: Vec<TaskSnapshot>,
) {
    let text = codec::serialize(&tasks).unwrap();

    assert_eq!(codec::deserialize(&text).unwrap(), tasks);
}

#[test]
fn given_chain_past_depth_limit_when_serializing_then_refused() {
    let result = codec::serialize(&chain(MAX_DEPTH + 1));

    assert!(matches!(
        result,
        Err(CodecError::TooDeep { depth, max }) if depth == MAX_DEPTH + 1 && max == MAX_DEPTH
    ));
}

#[test]
fn given_several_documents_when_deserializing_then_first_document_wins() {
    let tasks = codec::deserialize("tasks: [{description: a}]\n---\nfoo: 1\n").unwrap();

    assert_eq!(tasks, vec![TaskSnapshot::new("a")]);
}

#[test]
fn given_tasks_not_a_list_when_deserializing_then_empty_tree() {
    let tasks = codec::deserialize("tasks: not_a_list").unwrap();
    assert!(tasks.is_empty());
}

#[test]
fn given_non_map_document_when_deserializing_then_empty_tree() {
    assert!(codec::deserialize("- just\n- a list\n").unwrap().is_empty());
    assert!(codec::deserialize("").unwrap().is_empty());
}

#[test]
fn given_unparsable_text_when_decoding_then_store_untouched_and_silent() {
    let mut store = TaskStore::new();
    store.reset_with(scenario());
    let before = store.snapshot();
    let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::<TreeEvent>::new()));
    let sink = std::rc::Rc::clone(&events);
    store.subscribe(move |e: &TreeEvent| sink.borrow_mut().push(e.clone()));

    let result = codec::decode_into("tasks: [unclosed", &mut store);

    assert!(matches!(result, Err(CodecError::MalformedDocument(_))));
    assert_eq!(store.snapshot(), before);
    assert!(events.borrow().is_empty());
}

#[test]
fn given_decode_when_observed_then_single_reset_bracket() {
    let mut store = TaskStore::new();
    let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::<TreeEvent>::new()));
    let sink = std::rc::Rc::clone(&events);
    store.subscribe(move |e: &TreeEvent| sink.borrow_mut().push(e.clone()));

    codec::decode_into(SCENARIO_TEXT, &mut store).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![TreeEvent::ResetAboutToBegin, TreeEvent::Reset]
    );
    assert_eq!(store.node_count(), 3);
}

#[test]
fn given_flat_map_when_serializing_then_bytes_hex_and_unsupported_placeholder() {
    let mut values = FlatMap::new();
    values.insert("name".into(), FlatValue::Text("work".into()));
    values.insert("key".into(), FlatValue::Bytes(vec![0xde, 0xad]));
    values.insert("recent".into(), FlatValue::TextList(vec!["a".into(), "b".into()]));
    values.insert("count".into(), FlatValue::Integer(3));

    let text = codec::serialize_flat(&values).unwrap();

    assert_eq!(
        yaml(&text),
        yaml("count: (wrong type integer)\nkey: dead\nname: work\nrecent: [a, b]\n")
    );
}

#[test]
fn given_flat_document_when_deserializing_then_scalars_text_and_sequences_lists() {
    let values = codec::deserialize_flat("name: work\nport: 8080\nrecent: [a, 2]\n").unwrap();

    assert_eq!(values.get("name"), Some(&FlatValue::Text("work".into())));
    assert_eq!(values.get("port"), Some(&FlatValue::Text("8080".into())));
    assert_eq!(
        values.get("recent"),
        Some(&FlatValue::TextList(vec!["a".into(), "2".into()]))
    );
}
