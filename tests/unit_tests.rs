use datastore_codec::{
    check_kinds, decode_entity, decode_key, decode_results, encode_entity, encode_key,
    encode_query, parse_path_element, OutputOpts, RegistryOpts,
};
use datastore_core::{Identifier, KindRegistry, PathElement};
use serde_json::json;
use std::io::Write;

const REGISTRY: &str = r#"
kinds:
  - kind: Person
    fields:
      name:
        kind: string
      bio:
        kind: string
        indexed: false
      tags:
        kind: string
        multi: true
        indexed: false
  - namespace: Test
    kind: Company
    fields:
      name:
        kind: string
"#;

fn registry_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(REGISTRY.as_bytes()).unwrap();
    file
}

#[test]
fn test_registry_opts_default_is_empty() {
    let registry = RegistryOpts::default().load().unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_registry_opts_missing_file() {
    let opts = RegistryOpts {
        kinds: Some("/nonexistent/kinds.yaml".into()),
    };
    let err = opts.load().unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load kinds"));
}

#[test]
fn test_output_opts_pretty() {
    let value = json!({"a": 1});
    assert_eq!(OutputOpts { pretty: false }.render(&value).unwrap(), r#"{"a":1}"#);
    assert!(OutputOpts { pretty: true }
        .render(&value)
        .unwrap()
        .contains('\n'));
}

#[test]
fn test_parse_path_element() {
    assert_eq!(
        parse_path_element("Kind:123").unwrap(),
        PathElement::new("Kind", Identifier::Id(123))
    );
    assert_eq!(
        parse_path_element("Kind:name").unwrap(),
        PathElement::new("Kind", "name")
    );
    assert_eq!(
        parse_path_element("Kind").unwrap(),
        PathElement::incomplete("Kind")
    );
    assert_eq!(
        parse_path_element("Kind:'123'").unwrap(),
        PathElement::new("Kind", "123")
    );
    assert_eq!(
        parse_path_element("Kind:\"-7\"").unwrap(),
        PathElement::new("Kind", "-7")
    );
    assert!(parse_path_element("Kind:''").is_err());
    assert!(parse_path_element("Kind:").is_err());
    assert!(parse_path_element(":1").is_err());
}

#[test]
fn test_encode_key() {
    let proto = encode_key("Test", &["Company:acme".to_string(), "Person".to_string()]).unwrap();
    assert_eq!(
        serde_json::to_value(&proto).unwrap(),
        json!({
            "partition_id": {"namespace": "Test"},
            "path_element": [
                {"kind": "Company", "name": "acme"},
                {"kind": "Person"}
            ]
        })
    );

    let numeric_name = encode_key("", &["Kind:'123'".to_string()]).unwrap();
    assert_eq!(
        serde_json::to_value(&numeric_name).unwrap(),
        json!({"path_element": [{"kind": "Kind", "name": "123"}]})
    );

    assert!(encode_key("", &["Company".to_string(), "Person:1".to_string()]).is_err());
}

#[test]
fn test_decode_key() {
    let decoded = decode_key(r#"{"path_element":[{"kind":"Kind","id":1},{"kind":"Sub"}]}"#).unwrap();
    assert_eq!(
        decoded,
        json!({"key": {"path": [["Kind", 1], ["Sub"]]}, "complete": false})
    );

    assert!(decode_key("not json").is_err());
}

#[test]
fn test_encode_entity_without_registry() {
    let proto = encode_entity(
        r#"{"name": "Ann", "age": 30, "score": 1.5}"#,
        &KindRegistry::new(),
        None,
        None,
    )
    .unwrap();
    assert_eq!(
        serde_json::to_value(&proto).unwrap(),
        json!({
            "property": [
                {"name": "name", "value": {"string_value": "Ann"}},
                {"name": "age", "value": {"integer_value": 30}},
                {"name": "score", "value": {"double_value": 1.5}}
            ]
        })
    );
}

#[test]
fn test_encode_entity_with_registry() {
    let file = registry_file();
    let registry = RegistryOpts {
        kinds: Some(file.path().to_path_buf()),
    }
    .load()
    .unwrap();

    let proto = encode_entity(
        r#"{"name": "Ann", "bio": "long text", "tags": ["a", "b"]}"#,
        &registry,
        None,
        Some("Person"),
    )
    .unwrap();
    assert_eq!(
        serde_json::to_value(&proto).unwrap()["property"],
        json!([
            {"name": "name", "value": {"string_value": "Ann"}},
            {"name": "bio", "value": {"string_value": "long text", "indexed": false}},
            {"name": "tags", "value": {"list_value": [
                {"string_value": "a", "indexed": false},
                {"string_value": "b", "indexed": false}
            ]}}
        ])
    );
}

#[test]
fn test_encode_entity_with_key() {
    let proto = encode_entity(
        r#"{"__key__": {"$key": {"namespace": "Test", "path": [["Person", 7]]}}, "name": "Ann"}"#,
        &KindRegistry::new(),
        None,
        None,
    )
    .unwrap();
    let json = serde_json::to_value(&proto).unwrap();
    assert_eq!(
        json["key"],
        json!({"partition_id": {"namespace": "Test"}, "path_element": [{"kind": "Person", "id": 7}]})
    );
    assert_eq!(json["property"].as_array().unwrap().len(), 1);

    assert!(encode_entity(
        r#"{"__key__": "not a key"}"#,
        &KindRegistry::new(),
        None,
        None
    )
    .is_err());
}

#[test]
fn test_decode_entity() {
    let plain = decode_entity(
        r#"{"property": [{"name": "count", "value": {"integer_value": 5}}]}"#,
    )
    .unwrap();
    assert_eq!(plain, json!({"count": 5}));

    let keyed = decode_entity(
        r#"{"key": {"path_element": [{"kind": "Kind", "name": "a"}]},
            "property": [{"name": "total", "value": {"double_value": 7.8}}]}"#,
    )
    .unwrap();
    assert_eq!(
        keyed,
        json!({"key": {"path": [["Kind", "a"]]}, "data": {"total": 7.8}})
    );

    assert!(decode_entity(
        r#"{"property": [{"name": "x", "value": {"integer_value": 1, "string_value": "a"}}]}"#
    )
    .is_err());
}

#[test]
fn test_decode_results() {
    let decoded = decode_results(
        r#"[
            {"entity": {"key": {"path_element": [{"kind": "Kind", "id": 1}]},
                        "property": [{"name": "flagged", "value": {"boolean_value": true}}]}},
            {"entity": {"key": {"path_element": [{"kind": "Kind", "id": 2}]}}}
        ]"#,
    )
    .unwrap();
    assert_eq!(
        decoded,
        json!([
            {"key": {"path": [["Kind", 1]]}, "data": {"flagged": true}},
            {"key": {"path": [["Kind", 2]]}, "data": {}}
        ])
    );

    assert!(decode_results(r#"[{"entity": {"property": []}}]"#).is_err());
}

#[test]
fn test_encode_query() {
    let proto = encode_query(
        r#"
kind: Kind1
filters:
  - property: name
    op: "="
    value: John
ancestor:
  path: [["Kind2", "somename"]]
order: ["-age"]
limit: 10
"#,
    )
    .unwrap();
    let json = serde_json::to_value(&proto).unwrap();
    assert_eq!(json["kind"], json!([{"name": "Kind1"}]));
    assert_eq!(json["filter"]["composite_filter"]["operator"], "AND");
    assert_eq!(
        json["filter"]["composite_filter"]["filter"][1]["property_filter"]["operator"],
        "HAS_ANCESTOR"
    );
    assert_eq!(
        json["order"],
        json!([{"property": {"name": "age"}, "direction": "DESCENDING"}])
    );
    assert_eq!(json["limit"], 10);

    assert!(encode_query("kind: A\nfilters: [{property: x, op: '!=', value: 1}]\n").is_err());
}

#[test]
fn test_check_kinds() {
    let file = registry_file();
    let listed = check_kinds(file.path()).unwrap();
    assert_eq!(
        listed,
        json!([
            {"namespace": "", "kind": "Person", "fields": ["bio", "name", "tags"]},
            {"namespace": "Test", "kind": "Company", "fields": ["name"]}
        ])
    );
}

#[test]
fn test_check_kinds_rejects_invalid_kind() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"kinds:\n  - kind: \"000\"\n").unwrap();
    let err = check_kinds(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("000"));
}
