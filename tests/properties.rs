use json_node_patcher::engine::{EditorOptions, FormatMode, JsonNodeEditor};
use json_node_patcher::locate::locate;
use json_node_patcher::path::{JsonPath, Segment};
use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        prop::num::f64::NORMAL.prop_map(Value::from),
        "[a-zé \"\\\\]{0,8}".prop_map(Value::String),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..4)
                .prop_map(|members| Value::Object(members.into_iter().collect())),
        ]
    })
}

fn collect_paths(value: &Value, prefix: &[Segment], out: &mut Vec<Vec<Segment>>) {
    out.push(prefix.to_vec());
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let mut path = prefix.to_vec();
                path.push(Segment::key(key.clone()));
                collect_paths(child, &path, out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                let mut path = prefix.to_vec();
                path.push(Segment::index(idx));
                collect_paths(child, &path, out);
            }
        }
        _ => {}
    }
}

/// A document, its text, and one path that exists in it.
fn arb_target() -> impl Strategy<Value = (Value, String, JsonPath)> {
    (arb_json(), any::<Index>(), any::<bool>()).prop_map(|(value, pick, pretty)| {
        let mut paths = Vec::new();
        collect_paths(&value, &[], &mut paths);
        let segments = paths[pick.index(paths.len())].clone();
        let text = if pretty {
            serde_json::to_string_pretty(&value).unwrap()
        } else {
            serde_json::to_string(&value).unwrap()
        };
        (value, text, JsonPath::new(segments).unwrap())
    })
}

fn node_at_mut<'a>(value: &'a mut Value, path: &JsonPath) -> &'a mut Value {
    let mut current = value;
    for segment in path {
        current = match segment {
            Segment::Key(key) => current.get_mut(key.as_str()).unwrap(),
            Segment::Index(idx) => current.get_mut(*idx).unwrap(),
        };
    }
    current
}

fn preserve() -> JsonNodeEditor {
    JsonNodeEditor::new(EditorOptions {
        mode: FormatMode::Preserve,
        ..EditorOptions::default()
    })
}

proptest! {
    /// Writing back the current value leaves the tree unchanged
    #[test]
    fn prop_round_trip_identity((value, text, path) in arb_target()) {
        let located = locate(&text, &path).unwrap();
        let raw = serde_json::to_string(&located.value).unwrap();

        let out = JsonNodeEditor::default().apply(&text, &path, &raw).unwrap();
        let tree: Value = serde_json::from_str(&out).unwrap();
        prop_assert_eq!(tree, value);
    }

    /// Only the addressed node changes
    #[test]
    fn prop_path_isolation((value, text, path) in arb_target()) {
        let out = JsonNodeEditor::default().apply(&text, &path, "__new__").unwrap();

        let mut expected = value;
        *node_at_mut(&mut expected, &path) = json!("__new__");
        let tree: Value = serde_json::from_str(&out).unwrap();
        prop_assert_eq!(tree, expected);
    }

    /// Preserve mode touches nothing outside the node's span
    #[test]
    fn prop_preserve_keeps_outside_bytes((value, text, path) in arb_target()) {
        let located = locate(&text, &path).unwrap();
        let out = preserve().apply(&text, &path, "0").unwrap();

        prop_assert!(out.starts_with(&text[..located.byte_start]));
        prop_assert!(out.ends_with(&text[located.byte_end..]));

        let mut expected = value;
        *node_at_mut(&mut expected, &path) = json!(0);
        let tree: Value = serde_json::from_str(&out).unwrap();
        prop_assert_eq!(tree, expected);
    }

    /// Object candidates overlay existing objects: old keys survive, candidate keys win
    #[test]
    fn prop_object_overlay(
        old in prop::collection::vec(("[a-z]{1,2}", arb_leaf()), 0..5),
        overlay in prop::collection::vec(("[a-z]{1,2}", arb_leaf()), 0..5),
    ) {
        let old: Map<String, Value> = old.into_iter().collect();
        let overlay: Map<String, Value> = overlay.into_iter().collect();
        let doc = json!({"target": old.clone()}).to_string();
        let raw = Value::Object(overlay.clone()).to_string();
        let path = JsonPath::from_json_array(r#"["target"]"#).unwrap();

        let out = JsonNodeEditor::default().apply(&doc, &path, &raw).unwrap();
        let tree: Value = serde_json::from_str(&out).unwrap();
        let merged = tree["target"].as_object().unwrap();

        for (key, value) in &old {
            if !overlay.contains_key(key) {
                prop_assert_eq!(&merged[key], value);
            }
        }
        for (key, value) in &overlay {
            prop_assert_eq!(&merged[key], value);
        }
        let union: HashSet<_> = old.keys().chain(overlay.keys()).collect();
        prop_assert_eq!(merged.len(), union.len());
    }
}
