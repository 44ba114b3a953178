//! Float-aware rendering of task documents.
//!
//! Argument and output objects may carry a `_floatFields` marker listing keys
//! whose whole-number values must be written as `N.0`. Rendering strips the
//! markers and widens those numbers to floats, so the standard JSON writer
//! emits the trailing `.0`. A marker applies to its own object and to every
//! object and array nested below it.

use super::FLOAT_FIELDS_KEY;
use crate::coercion::literal::as_float_number;
use ahash::AHashSet;
use serde_json::{Map, Value};

/// Renders `value` with no inherited float fields.
pub fn render(value: &Value) -> Value {
    render_float_aware(value, &AHashSet::new())
}

/// Renders `value`, treating every key in `inherited` as float-flagged.
pub fn render_float_aware(value: &Value, inherited: &AHashSet<String>) -> Value {
    match value {
        Value::Object(map) => {
            let scope = scope_for(map, inherited);
            let rendered = map
                .iter()
                .filter(|(key, _)| key.as_str() != FLOAT_FIELDS_KEY)
                .map(|(key, child)| {
                    let child = if scope.contains(key) {
                        floatify(child, &scope)
                    } else {
                        render_float_aware(child, &scope)
                    };
                    (key.clone(), child)
                })
                .collect::<Map<_, _>>();
            Value::Object(rendered)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render_float_aware(item, inherited))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Pretty-prints with two-space indentation after float-aware rendering.
pub fn to_pretty_string(value: &Value) -> String {
    let rendered = render(value);
    serde_json::to_string_pretty(&rendered).unwrap_or_else(|_| rendered.to_string())
}

/// Names listed in an object's own `_floatFields` marker.
pub fn marker_names(map: &Map<String, Value>) -> Vec<String> {
    match map.get(FLOAT_FIELDS_KEY) {
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(|name| name.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

fn scope_for(map: &Map<String, Value>, inherited: &AHashSet<String>) -> AHashSet<String> {
    let own = marker_names(map);
    if own.is_empty() {
        return inherited.clone();
    }
    inherited.iter().cloned().chain(own).collect()
}

// Value sitting at a flagged key: the number itself, or the numeric members
// of an array, become floats.
fn floatify(value: &Value, scope: &AHashSet<String>) -> Value {
    match value {
        Value::Number(number) => Value::Number(as_float_number(number)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Number(number) => Value::Number(as_float_number(number)),
                    other => render_float_aware(other, scope),
                })
                .collect(),
        ),
        other => render_float_aware(other, scope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marker_is_stripped_and_numbers_widened() {
        let value = json!({"amount": 100, "count": 3, "_floatFields": ["amount"]});
        let text = serde_json::to_string(&render(&value)).unwrap();
        assert_eq!(text, r#"{"amount":100.0,"count":3}"#);
    }

    #[test]
    fn test_markers_are_inherited_by_nested_values() {
        let value = json!({
            "_floatFields": ["price"],
            "items": [{"price": 5, "qty": 2}, {"price": 7.25, "qty": 1}],
            "summary": {"price": [1, 2.5], "_floatFields": ["qty"], "qty": 4}
        });
        let text = serde_json::to_string(&render(&value)).unwrap();
        assert_eq!(
            text,
            r#"{"items":[{"price":5.0,"qty":2},{"price":7.25,"qty":1}],"summary":{"price":[1.0,2.5],"qty":4.0}}"#
        );
    }

    #[test]
    fn test_unflagged_values_are_untouched() {
        let value = json!(["a", 1, {"b": null}]);
        assert_eq!(render(&value), value);
    }
}
