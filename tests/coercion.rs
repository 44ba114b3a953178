//! Tests for coercing raw parameter text against operation schemas.
mod common;
use serde_json::json;
use tasksmith::prelude::*;

fn filters_schema() -> ParameterSchema {
    let registry = common::registry();
    registry.get("get_subscription").unwrap().parameters["filters"].clone()
}

#[test]
fn test_object_members_are_coerced_by_declared_type() {
    let schema = ParameterSchema::object(
        [
            ("a".to_string(), ParameterSchema::new(ParameterType::Number)),
            ("b".to_string(), ParameterSchema::new(ParameterType::Boolean)),
        ]
        .into_iter()
        .collect(),
    );
    let coerced = coerce(r#"{"a": "5", "b": "True"}"#, &schema, "payload", CoercionSite::Execute).unwrap();
    assert_eq!(coerced.value, json!({"a": 5, "b": true}));
    assert!(!coerced.float_flagged);
}

#[test]
fn test_python_literals_and_unknown_keys_in_objects() {
    let coerced = coerce(
        r#"{"min": "2.5", "active": True, "extra": "7"}"#,
        &filters_schema(),
        "filters",
        CoercionSite::Execute,
    )
    .unwrap();
    assert_eq!(coerced.value, json!({"min": 2.5, "active": true, "extra": "7"}));
}

#[test]
fn test_invalid_object_json_is_a_hard_error() {
    let err = coerce("{bad json", &filters_schema(), "filters", CoercionSite::Execute).unwrap_err();
    match err {
        CoercionError::InvalidJsonParameter { field, .. } => assert_eq!(field, "filters"),
    }
}

#[test]
fn test_nested_objects_are_coerced_at_any_depth() {
    let schema = ParameterSchema::object(
        [(
            "inner".to_string(),
            ParameterSchema::object(
                [("n".to_string(), ParameterSchema::new(ParameterType::Number))]
                    .into_iter()
                    .collect(),
            ),
        )]
        .into_iter()
        .collect(),
    );
    let coerced = coerce(r#"{"inner": {"n": "3"}}"#, &schema, "outer", CoercionSite::Execute).unwrap();
    assert_eq!(coerced.value, json!({"inner": {"n": 3}}));

    let empty = coerce(r#"{"inner": ""}"#, &schema, "outer", CoercionSite::Execute).unwrap();
    assert_eq!(empty.value, json!({"inner": {}}));

    let err = coerce(r#"{"inner": "{nope"}"#, &schema, "outer", CoercionSite::Execute).unwrap_err();
    match err {
        CoercionError::InvalidJsonParameter { field, .. } => assert_eq!(field, "outer.inner"),
    }
}

#[test]
fn test_non_object_json_passes_through() {
    let coerced = coerce("[1, 2]", &filters_schema(), "filters", CoercionSite::Execute).unwrap();
    assert_eq!(coerced.value, json!([1, 2]));
}

#[test]
fn test_arrays_are_parsed_leniently() {
    let array = ParameterSchema::new(ParameterType::Array);
    let coerced = coerce("[True, \"x\", 3]", &array, "tags", CoercionSite::Execute).unwrap();
    assert_eq!(coerced.value, json!([true, "x", 3]));
    let fallback = coerce("not a list", &array, "tags", CoercionSite::Execute).unwrap();
    assert_eq!(fallback.value, json!("not a list"));
}

#[test]
fn test_number_fields_flag_whole_values() {
    let number = ParameterSchema::new(ParameterType::Number);
    for (raw, expected, flagged) in [
        ("100", json!(100), true),
        ("100.5", json!(100.5), false),
        ("4241.0", json!(4241), true),
        ("-7", json!(-7), true),
        ("1e3", json!(1000), false),
    ] {
        let coerced = coerce(raw, &number, "amount", CoercionSite::Execute).unwrap();
        assert_eq!(coerced.value, expected, "raw {}", raw);
        assert_eq!(coerced.float_flagged, flagged, "raw {}", raw);
    }
}

#[test]
fn test_identifier_fields_stay_strings_when_reconstructing() {
    let number = ParameterSchema::new(ParameterType::Number);
    for field in ["subscription_id", "created_by", "assigned_to", "phone", "mobile_no"] {
        let coerced = coerce("00336", &number, field, CoercionSite::Canonical).unwrap();
        assert_eq!(coerced.value, json!("00336"), "field {}", field);
    }
    let coerced = coerce("336", &number, "amount", CoercionSite::Canonical).unwrap();
    assert_eq!(coerced.value, json!(336));
}
