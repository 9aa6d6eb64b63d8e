//! Purpose: Regression coverage for parse-failure category mapping.
//! Exports: Integration tests only.
//! Role: Verify stable category labels used by `loads` parse diagnostics.
//! Invariants: Category mapping remains deterministic for representative messages.
//! Invariants: Tests avoid payload leakage; assertions target category/hint text only.
//! Notes: Uses source include to exercise internal helper logic without widening API surface.

#[path = "../src/json/parse.rs"]
mod parse;

use parse::ParseFailureCategory;
use serde_json::Value;

#[test]
fn category_mapping_handles_parser_style_messages() {
    let cases = [
        ("InvalidUTF8 at character 0", ParseFailureCategory::Utf8),
        ("InvalidNumber at character 5", ParseFailureCategory::NumericRange),
        ("recursion limit exceeded while parsing", ParseFailureCategory::DepthLimit),
        ("Eof at character 9", ParseFailureCategory::Eof),
        ("ExpectedArrayComma at character 4", ParseFailureCategory::Syntax),
        ("opaque parser issue", ParseFailureCategory::Unknown),
    ];
    for (message, category) in cases {
        assert_eq!(parse::categorize_message(message), category, "{message}");
    }
}

#[test]
fn labels_are_stable() {
    assert_eq!(ParseFailureCategory::NumericRange.label(), "numeric-range");
    assert_eq!(ParseFailureCategory::DepthLimit.label(), "depth-limit");
    assert_eq!(ParseFailureCategory::Unknown.label(), "unknown");
}

#[test]
fn hint_names_category_and_context_but_not_input() {
    let err = parse::from_str::<Value>(r#"{"api_key": "sk-live-value""#).unwrap_err();
    let hint = parse::hint_for_error(&err, "test.context");
    assert!(hint.contains("parse category: "));
    assert!(hint.contains("context: test.context"));
    assert!(!hint.contains("sk-live-value"));
}

#[test]
fn valid_serialized_node_decodes() {
    let value = parse::from_str::<Value>(
        r#"{"lc": 1, "type": "constructor", "id": ["langchain", "prompts", "PromptTemplate"]}"#,
    )
    .expect("json");
    assert_eq!(value["id"][2], "PromptTemplate");
    assert_eq!(value["lc"], 1);
}
