use json_node_patcher::config::load_from_path;
use json_node_patcher::engine::{EngineError, JsonNodeEditor};
use json_node_patcher::path::JsonPath;
use serde_json::{json, Value};
use std::fs;

fn load_fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

fn editor_from(config: &str) -> JsonNodeEditor {
    let config = load_from_path(format!("tests/fixtures/{config}")).expect("config");
    JsonNodeEditor::new(config.to_options())
}

fn path(input: &str) -> JsonPath {
    JsonPath::from_json_array(input).expect("path")
}

#[test]
fn merge_dependency_preserving_layout_fixture() {
    let input = load_fixture("package.json.input");
    let expected = load_fixture("package.json.expected");
    let editor = editor_from("four_space_preserve.toml");
    let target = path(r#"["dependencies"]"#);

    let update = editor
        .update(&input, &target, r#"{"serde": "^2.0.0"}"#)
        .expect("update");
    assert!(update.merged);
    assert!(update.value_changed);
    assert_eq!(update.document, expected);

    let again = editor
        .update(&update.document, &target, r#"{"serde": "^2.0.0"}"#)
        .expect("second update");
    assert!(!again.value_changed);
    assert_eq!(again.document, expected);
}

#[test]
fn replace_array_element_canonical_fixture() {
    let input = load_fixture("settings.json.input");
    let expected = load_fixture("settings.json.expected");
    let editor = editor_from("canonical_newline.toml");
    let target = path(r#"["files", 1]"#);

    let output = editor.apply(&input, &target, "c.txt").expect("apply");
    assert_eq!(output, expected);

    let again = editor.apply(&output, &target, "c.txt").expect("second apply");
    assert_eq!(again, expected);
}

#[test]
fn merge_keeps_members_the_caller_never_saw() {
    let doc = r#"{"customer": [{"name": "Ada", "address": {"city": "London"}, "tags": ["vip"]}]}"#;
    let out = JsonNodeEditor::default()
        .apply(doc, &path(r#"["customer", 0]"#), r#"{"name": "Grace"}"#)
        .expect("apply");
    let tree: Value = serde_json::from_str(&out).expect("output parses");
    assert_eq!(
        tree,
        json!({"customer": [{"name": "Grace", "address": {"city": "London"}, "tags": ["vip"]}]})
    );
}

#[test]
fn nested_candidate_object_replaces_nested_node() {
    let doc = r#"{"o": {"inner": {"keep": 1, "change": 2}, "other": true}}"#;
    let out = JsonNodeEditor::default()
        .apply(doc, &path(r#"["o"]"#), r#"{"inner": {"change": 3}}"#)
        .expect("apply");
    let tree: Value = serde_json::from_str(&out).expect("output parses");
    assert_eq!(tree, json!({"o": {"inner": {"change": 3}, "other": true}}));
}

#[test]
fn failures_leave_no_partial_output() {
    let editor = JsonNodeEditor::default();

    let err = editor
        .apply(r#"{"a": 1}"#, &path(r#"["b"]"#), "1")
        .unwrap_err();
    match err {
        EngineError::PathNotFound { path, .. } => assert_eq!(path, r#"$["b"]"#),
        other => panic!("unexpected {other:?}"),
    }

    let err = editor
        .apply(r#"{"a": 1}"#, &path("[0]"), "1")
        .unwrap_err();
    assert!(err.is_path_not_found());

    let err = editor.apply("{invalid", &JsonPath::root(), "1").unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn suggestion_offered_for_near_miss_key() {
    let err = JsonNodeEditor::default()
        .apply(r#"{"version": 1}"#, &path(r#"["verison"]"#), "2")
        .unwrap_err();
    match err {
        EngineError::PathNotFound { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("version"))
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn editor_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JsonNodeEditor>();

    let editor = std::sync::Arc::new(JsonNodeEditor::default());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let editor = editor.clone();
            std::thread::spawn(move || {
                editor
                    .apply(r#"{"n": 0}"#, &path(r#"["n"]"#), &n.to_string())
                    .expect("apply")
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let out = handle.join().expect("thread");
        assert_eq!(out, format!("{{\n  \"n\": {n}\n}}"));
    }
}
