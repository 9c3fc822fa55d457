//! Tests for decoder module

use super::*;
use serde_json::json;

#[test]
fn test_decode_records_and_top_level_cursor() {
    let decoder = PageDecoder::new();
    let body = r#"{"data": [{"id": 1}, {"id": 2}], "cursor": "abc", "has_more": true}"#;

    let page = decoder.decode(body).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.records[0]["id"], 1);
    assert_eq!(page.records[1]["id"], 2);
    assert_eq!(page.next_cursor.as_deref(), Some("abc"));
    assert_eq!(page.more_available, Some(true));
}

#[test]
fn test_decode_missing_data_is_empty_page() {
    let decoder = PageDecoder::new();
    let page = decoder.decode(r#"{"meta": {"total": 0}}"#).unwrap();

    assert!(page.is_empty());
    assert!(!page.has_cursor());
    assert_eq!(page.more_available, None);
}

#[test]
fn test_decode_non_array_data_is_empty_page() {
    let decoder = PageDecoder::new();
    let page = decoder.decode(r#"{"data": {"id": 1}}"#).unwrap();
    assert!(page.is_empty());
}

#[test]
fn test_decode_nested_meta_cursor() {
    let decoder = PageDecoder::new();
    let body = r#"{"data": [{"id": 1}], "meta": {"cursor": "from-meta"}}"#;

    let page = decoder.decode(body).unwrap();
    assert_eq!(page.next_cursor.as_deref(), Some("from-meta"));
}

#[test]
fn test_top_level_cursor_wins_over_meta() {
    let decoder = PageDecoder::new();
    let body = r#"{"data": [], "cursor": "root", "meta": {"cursor": "nested"}}"#;

    let page = decoder.decode(body).unwrap();
    assert_eq!(page.next_cursor.as_deref(), Some("root"));
}

#[test]
fn test_empty_top_level_cursor_falls_through_to_meta() {
    let decoder = PageDecoder::new();
    let body = r#"{"data": [], "cursor": "", "meta": {"cursor": "nested"}}"#;

    let page = decoder.decode(body).unwrap();
    assert_eq!(page.next_cursor.as_deref(), Some("nested"));
}

#[test]
fn test_empty_or_null_cursor_is_absent() {
    let decoder = PageDecoder::new();

    let page = decoder
        .decode(r#"{"data": [], "cursor": null, "meta": {"cursor": ""}}"#)
        .unwrap();
    assert_eq!(page.next_cursor, None);
}

#[test]
fn test_numeric_cursor_is_rendered() {
    let decoder = PageDecoder::new();
    let page = decoder.decode(r#"{"data": [], "cursor": 4200}"#).unwrap();
    assert_eq!(page.next_cursor.as_deref(), Some("4200"));
}

#[test]
fn test_non_boolean_has_more_is_unset() {
    let decoder = PageDecoder::new();
    let page = decoder.decode(r#"{"data": [], "has_more": "yes"}"#).unwrap();
    assert_eq!(page.more_available, None);

    let page = decoder.decode(r#"{"data": [], "has_more": false}"#).unwrap();
    assert_eq!(page.more_available, Some(false));
}

#[test]
fn test_decode_invalid_json_is_error() {
    let decoder = PageDecoder::new();
    let err = decoder.decode("<html>Bad Gateway</html>").unwrap_err();
    assert!(err.to_string().contains("Failed to decode response"));
}

#[test]
fn test_decode_value_keeps_record_order() {
    let decoder = PageDecoder::new();
    let value = json!({"data": [{"n": 3}, {"n": 1}, {"n": 2}]});

    let page = decoder.decode_value(&value);
    let order: Vec<i64> = page
        .records
        .iter()
        .map(|r| r["n"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![3, 1, 2]);
}

#[test]
fn test_lookup_path() {
    let value = json!({"meta": {"page": {"cursor": "deep"}}});
    assert_eq!(
        lookup_path(&value, "meta.page.cursor"),
        Some(&json!("deep"))
    );
    assert_eq!(lookup_path(&value, "meta.missing"), None);
}
