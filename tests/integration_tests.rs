use serde_json::json;
use structon::{
    detach, from_str, from_str_with_options, from_value, schema, to_string, to_string_pretty,
    to_value, DecodeOptions, Error, NodeList,
};

#[derive(Debug, Default, PartialEq)]
struct Probe {
    id: i32,
    label: Option<String>,
}

schema! {
    Probe {
        id: int,
        label: string,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Device {
    id: i8,
    num: i16,
    max: i32,
    value: f64,
    active: bool,
    name: Option<String>,
    probe: Option<Box<Probe>>,
    probes: NodeList<Probe>,
    tags: [Option<String>; 2],
    codes: NodeList<i32>,
    labels: NodeList<String>,
}

schema! {
    Device {
        id: char,
        num: short,
        max: int,
        value: double,
        active: bool,
        name: string,
        probe: nested(Probe),
        probes: list(Probe),
        tags: array(string, 2),
        codes: list(i32),
        labels: list(String),
    }
}

fn sample_text() -> &'static str {
    r#"{
        "id": 1, "num": 300, "max": 1000, "value": 10.3, "active": true,
        "name": "ada",
        "probe": {"id": 20, "label": "hello world"},
        "probes": [{"id": 21, "label": "first"}, {"id": 22, "label": "second"}],
        "tags": ["array1", "array2"],
        "codes": [1, 12, 52],
        "labels": ["str1", "str2"]
    }"#
}

#[test]
fn test_full_document_decodes_every_field() {
    let device = from_str::<Device>(sample_text()).unwrap().unwrap();

    assert_eq!(device.id, 1);
    assert_eq!(device.num, 300);
    assert_eq!(device.max, 1000);
    assert_eq!(device.value, 10.3);
    assert!(device.active);
    assert_eq!(device.name.as_deref(), Some("ada"));

    let probe = device.probe.as_ref().unwrap();
    assert_eq!(probe.id, 20);
    assert_eq!(probe.label.as_deref(), Some("hello world"));

    let ids: Vec<i32> = device.probes.iter().flatten().map(|p| p.id).collect();
    assert_eq!(ids, vec![21, 22]);

    assert_eq!(device.tags[0].as_deref(), Some("array1"));
    assert_eq!(device.tags[1].as_deref(), Some("array2"));

    let codes: Vec<i32> = device.codes.iter().flatten().copied().collect();
    assert_eq!(codes, vec![1, 12, 52]);

    let labels: Vec<&String> = device.labels.iter().flatten().collect();
    assert_eq!(labels, vec!["str1", "str2"]);
}

#[test]
fn test_full_document_roundtrips() {
    let device = from_str::<Device>(sample_text()).unwrap().unwrap();
    let text = to_string(&*device).unwrap();
    let again = from_str::<Device>(&text).unwrap().unwrap();
    assert_eq!(device, again);
}

#[test]
fn test_key_order_follows_descriptors() {
    let user = from_str::<Probe>(r#"{"label": "x", "id": 7}"#).unwrap().unwrap();
    // Declared order wins over document order.
    assert_eq!(to_string(&*user).unwrap(), r#"{"id":7,"label":"x"}"#);
}

#[test]
fn test_empty_document_yields_defaults() {
    let device = from_str::<Device>("{}").unwrap().unwrap();

    assert_eq!(device.id, 0);
    assert_eq!(device.num, 0);
    assert_eq!(device.max, 0);
    assert_eq!(device.value, 0.0);
    assert!(!device.active);
    assert_eq!(device.name, None);
    assert!(device.probe.is_none());
    assert!(device.probes.is_empty());
    assert_eq!(device.tags, [None, None]);
    assert!(device.codes.is_empty());
    assert!(device.labels.is_empty());
}

#[test]
fn test_null_root() {
    assert_eq!(from_str::<Device>("null").unwrap(), None);
    assert_eq!(to_value::<Device>(None).unwrap(), json!(null));
}

#[test]
fn test_null_nested_field_decodes_to_none_and_is_omitted() {
    let device = from_str::<Device>(r#"{"probe": null}"#).unwrap().unwrap();
    assert!(device.probe.is_none());

    let tree = to_value(Some(&*device)).unwrap();
    let object = tree.as_object().unwrap();
    assert!(!object.contains_key("probe"));
    assert!(!object.contains_key("name"));
    // Numeric, bool and fixed-array fields are always present.
    assert_eq!(object.get("id"), Some(&json!(0)));
    assert_eq!(object.get("active"), Some(&json!(false)));
    assert_eq!(object.get("tags"), Some(&json!([null, null])));
}

#[test]
fn test_list_preserves_order_and_empty_slots() {
    let device = from_str::<Device>(r#"{"probes": [{"id": 1}, null, {"id": 2}]}"#)
        .unwrap()
        .unwrap();

    // Three slots, the middle one empty, matching the source indices.
    assert_eq!(device.probes.len(), 3);
    let slots: Vec<Option<i32>> = device.probes.iter().map(|p| p.map(|p| p.id)).collect();
    assert_eq!(slots, vec![Some(1), None, Some(2)]);

    // Empty slots are dropped from encoded output.
    let tree = to_value(Some(&*device)).unwrap();
    assert_eq!(tree["probes"], json!([{"id": 1}, {"id": 2}]));
}

#[test]
fn test_fixed_array_shorter_input_leaves_defaults() {
    let device = from_str::<Device>(r#"{"tags": ["only"], "codes": []}"#)
        .unwrap()
        .unwrap();
    assert_eq!(device.tags[0].as_deref(), Some("only"));
    assert_eq!(device.tags[1], None);
    assert!(device.codes.is_empty());
}

#[test]
fn test_fixed_array_longer_input_ignores_extras() {
    let device = from_str::<Device>(r#"{"tags": ["a", "b", "c", "d"]}"#)
        .unwrap()
        .unwrap();
    assert_eq!(device.tags[0].as_deref(), Some("a"));
    assert_eq!(device.tags[1].as_deref(), Some("b"));
}

#[test]
fn test_fixed_array_always_encodes_declared_length() {
    let device = from_str::<Device>(r#"{"tags": ["only"]}"#).unwrap().unwrap();
    let tree = to_value(Some(&*device)).unwrap();
    assert_eq!(tree["tags"], json!(["only", null]));

    // A null slot decodes back to None, closing the loop.
    let again = from_str::<Device>(&to_string(&*device).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(again.tags, device.tags);
}

#[test]
fn test_numbers_truncate_to_integer_fields() {
    let device = from_str::<Device>(r#"{"max": 10.9, "value": 3}"#).unwrap().unwrap();
    assert_eq!(device.max, 10);
    assert_eq!(device.value, 3.0);
}

#[test]
fn test_lenient_mismatch_defaults_the_field() {
    let device = from_str::<Device>(r#"{"max": "not a number", "name": 5}"#)
        .unwrap()
        .unwrap();
    assert_eq!(device.max, 0);
    assert_eq!(device.name, None);
}

#[test]
fn test_strict_mismatch_is_an_error() {
    let result = from_str_with_options::<Device>(
        r#"{"max": "not a number"}"#,
        &DecodeOptions::strict(),
    );
    match result {
        Err(Error::Mismatch { field, expected, found }) => {
            assert_eq!(field, "max");
            assert_eq!(expected, "number");
            assert_eq!(found, "string");
        }
        other => panic!("expected a mismatch error, got {:?}", other),
    }
}

#[test]
fn test_strict_accepts_absent_and_null_fields() {
    let device = from_str_with_options::<Device>(
        r#"{"probe": null, "max": 3}"#,
        &DecodeOptions::strict(),
    )
    .unwrap()
    .unwrap();
    assert!(device.probe.is_none());
    assert_eq!(device.max, 3);
}

#[test]
fn test_strict_rejects_non_array_list() {
    let result =
        from_str_with_options::<Device>(r#"{"probes": 5}"#, &DecodeOptions::strict());
    assert!(matches!(result, Err(Error::Mismatch { .. })));
}

#[derive(Debug, Default)]
struct TreeNode {
    value: i32,
    child: Option<Box<TreeNode>>,
}

schema! {
    TreeNode {
        value: int,
        child: nested(TreeNode),
    }
}

fn nested_doc(depth: usize) -> String {
    let mut text = String::new();
    for _ in 0..depth {
        text.push_str(r#"{"value": 1, "child": "#);
    }
    text.push_str("null");
    for _ in 0..depth {
        text.push('}');
    }
    text
}

#[test]
fn test_depth_limit_guards_recursion() {
    let options = DecodeOptions::new().with_max_depth(16);

    let shallow = from_str_with_options::<TreeNode>(&nested_doc(8), &options);
    assert!(shallow.is_ok());

    let deep = from_str_with_options::<TreeNode>(&nested_doc(64), &options);
    assert!(matches!(deep, Err(Error::DepthExceeded { limit: 16 })));
}

#[derive(Debug, Default, PartialEq)]
struct Envelope {
    kind: Option<String>,
    payload: Option<String>,
}

schema! {
    Envelope {
        kind: string,
        payload: json,
    }
}

#[test]
fn test_raw_json_defers_decoding() {
    let envelope = from_str::<Envelope>(
        r#"{"kind": "batch", "payload": {"items": [1, 2, 3], "done": false}}"#,
    )
    .unwrap()
    .unwrap();

    // The subtree is kept verbatim as compact text.
    assert_eq!(
        envelope.payload.as_deref(),
        Some(r#"{"items":[1,2,3],"done":false}"#)
    );

    // Encoding re-attaches the parsed subtree.
    let tree = to_value(Some(&*envelope)).unwrap();
    assert_eq!(
        tree,
        json!({"kind": "batch", "payload": {"items": [1, 2, 3], "done": false}})
    );
}

#[test]
fn test_raw_json_absent_key_stays_none() {
    let envelope = from_str::<Envelope>(r#"{"kind": "empty"}"#).unwrap().unwrap();
    assert_eq!(envelope.payload, None);

    let tree = to_value(Some(&*envelope)).unwrap();
    assert!(!tree.as_object().unwrap().contains_key("payload"));
}

#[test]
fn test_detach_splits_the_subtree_out() {
    let mut device = from_str::<Device>(sample_text()).unwrap().unwrap();

    let probe: Box<Probe> = detach(&mut *device, "probe").unwrap();
    assert_eq!(probe.id, 20);
    assert!(device.probe.is_none());

    // A second detach finds the slot empty.
    assert!(detach::<Device, Probe>(&mut *device, "probe").is_none());

    let tree = to_value(Some(&*device)).unwrap();
    assert!(!tree.as_object().unwrap().contains_key("probe"));
}

#[test]
fn test_decode_from_parsed_tree() {
    let tree = json!({"id": 9, "label": "from tree"});
    let probe = from_value::<Probe>(&tree).unwrap().unwrap();
    assert_eq!(probe.id, 9);
    assert_eq!(probe.label.as_deref(), Some("from tree"));
}

#[test]
fn test_pretty_text_roundtrips() {
    let device = from_str::<Device>(sample_text()).unwrap().unwrap();
    let pretty = to_string_pretty(&*device).unwrap();
    assert!(pretty.contains('\n'));
    let again = from_str::<Device>(&pretty).unwrap().unwrap();
    assert_eq!(device, again);
}

#[test]
fn test_unknown_document_fields_are_dropped() {
    let probe = from_str::<Probe>(r#"{"id": 1, "extra": [1, 2], "label": "x"}"#)
        .unwrap()
        .unwrap();
    assert_eq!(probe.id, 1);
    assert_eq!(to_string(&*probe).unwrap(), r#"{"id":1,"label":"x"}"#);
}
