use mdn_converter::common::json::JsonUtil;
use serde_json::json;

#[test]
fn strict_parse_rejects_yaml_syntax() {
    let err = JsonUtil::parse_strict("FORMAT", "Data!A1: {bold: true}").expect_err("yaml");
    assert!(err.to_string().starts_with("malformed FORMAT section: "));
}

#[test]
fn strict_parse_accepts_json() {
    let value = JsonUtil::parse_strict("FORMULAS", "{\"Data!A1\": \"=1\"}").expect("json");
    assert_eq!(value, json!({ "Data!A1": "=1" }));
}

#[test]
fn type_names() {
    assert_eq!(JsonUtil::type_name(&json!(null)), "null");
    assert_eq!(JsonUtil::type_name(&json!(true)), "boolean");
    assert_eq!(JsonUtil::type_name(&json!(1.5)), "number");
    assert_eq!(JsonUtil::type_name(&json!("x")), "string");
    assert_eq!(JsonUtil::type_name(&json!([])), "array");
    assert_eq!(JsonUtil::type_name(&json!({})), "object");
}

#[test]
fn pretty_output_is_indented() {
    let text = JsonUtil::to_pretty(&json!({ "a": 1 })).expect("pretty");
    assert_eq!(text, "{\n  \"a\": 1\n}");
}
