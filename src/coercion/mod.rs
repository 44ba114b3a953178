//! Turns free-text parameter input into typed JSON values.
//!
//! Rules are applied in a fixed order: empty text stays an empty string,
//! strings pass through, numbers and booleans are parsed leniently (falling
//! back to the original text), arrays are parsed leniently, and objects with
//! declared properties are parsed strictly and coerced field by field.
//! Only the strict object case can fail.

use crate::error::CoercionError;
use crate::schema::{ParameterSchema, ParameterType};
use crate::task::FLOAT_FIELDS_KEY;
use indexmap::IndexMap;
use serde_json::{Map, Value};

pub mod literal;

use literal::*;

/// Where a coercion pass runs. The two call sites apply slightly different rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionSite {
    /// Building the payload for a backend call.
    Execute,
    /// Reconstructing the canonical task document. Identifier-like and
    /// phone-like fields keep numeric-looking text as strings here.
    Canonical,
}

/// The result of coercing one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: Value,
    /// The value must be re-emitted as `N.0` on export.
    pub float_flagged: bool,
}

impl Coerced {
    fn plain(value: Value) -> Self {
        Self {
            value,
            float_flagged: false,
        }
    }
}

/// Field names whose numeric-looking values are opaque identifiers.
pub fn is_identifier_field(field_name: &str) -> bool {
    field_name.contains("_id") || field_name.contains("_by") || field_name.contains("_to")
}

/// Field names that are never coerced to numbers.
pub fn is_phone_field(field_name: &str) -> bool {
    field_name.contains("phone") || field_name.contains("mobile")
}

/// Coerces raw text against a parameter schema.
pub fn coerce(
    raw: &str,
    schema: &ParameterSchema,
    field_name: &str,
    site: CoercionSite,
) -> Result<Coerced, CoercionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Coerced::plain(Value::String(String::new())));
    }

    if site == CoercionSite::Canonical
        && (is_identifier_field(field_name) || is_phone_field(field_name))
        && looks_numeric(raw)
    {
        return Ok(Coerced::plain(Value::String(raw.to_string())));
    }

    match schema.param_type {
        ParameterType::String => Ok(Coerced::plain(Value::String(raw.to_string()))),
        ParameterType::Number | ParameterType::Integer => Ok(coerce_number(raw, schema.param_type)),
        ParameterType::Boolean => Ok(Coerced::plain(
            parse_boolean(raw)
                .map(Value::Bool)
                .unwrap_or_else(|| Value::String(raw.to_string())),
        )),
        ParameterType::Array => Ok(Coerced::plain(match parse_json_lenient(raw) {
            Ok(value @ Value::Array(_)) => value,
            _ => Value::String(raw.to_string()),
        })),
        ParameterType::Object => match &schema.properties {
            Some(properties) => {
                coerce_declared_object(raw, properties, field_name, site).map(Coerced::plain)
            }
            None => Ok(Coerced::plain(
                parse_json_lenient(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
            )),
        },
    }
}

fn coerce_number(raw: &str, param_type: ParameterType) -> Coerced {
    match parse_number(raw) {
        Some(value) => {
            let float_flagged = is_whole_float_literal(raw)
                || (param_type == ParameterType::Number && is_bare_integer(raw));
            Coerced {
                value,
                float_flagged,
            }
        }
        None => Coerced::plain(Value::String(raw.to_string())),
    }
}

fn coerce_declared_object(
    raw: &str,
    properties: &IndexMap<String, ParameterSchema>,
    field_name: &str,
    site: CoercionSite,
) -> Result<Value, CoercionError> {
    let parsed = parse_json_lenient(raw).map_err(|e| CoercionError::InvalidJsonParameter {
        field: field_name.to_string(),
        message: e.to_string(),
    })?;
    match parsed {
        Value::Object(map) => coerce_members(map, properties, field_name, site).map(Value::Object),
        // Valid JSON of another shape is left for the backend to judge.
        other => Ok(other),
    }
}

/// Coerces the declared members of an object. At the canonical site the
/// float-flagged member names are listed in the object's own marker.
fn coerce_members(
    map: Map<String, Value>,
    properties: &IndexMap<String, ParameterSchema>,
    parent: &str,
    site: CoercionSite,
) -> Result<Map<String, Value>, CoercionError> {
    let mut flagged = Vec::new();
    let mut members = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = match properties.get(&key) {
            Some(sub_schema) => {
                let path = format!("{}.{}", parent, key);
                let coerced = coerce_nested(value, sub_schema, &key, &path, site)?;
                if coerced.float_flagged {
                    flagged.push(Value::String(key.clone()));
                }
                coerced.value
            }
            None => value,
        };
        members.insert(key, value);
    }
    if site == CoercionSite::Canonical && !flagged.is_empty() {
        members.insert(FLOAT_FIELDS_KEY.to_string(), Value::Array(flagged));
    }
    Ok(members)
}

/// Coerces a value that already sits inside a parsed object. Values that are
/// already typed are kept; string values go through the scalar rules.
fn coerce_nested(
    value: Value,
    schema: &ParameterSchema,
    key: &str,
    path: &str,
    site: CoercionSite,
) -> Result<Coerced, CoercionError> {
    match value {
        Value::String(text) if text.trim().is_empty() => Ok(Coerced::plain(match schema.param_type {
            ParameterType::Object => Value::Object(Map::new()),
            _ => Value::String(text),
        })),
        // Report nested parse failures against the full path.
        Value::String(text) if schema.param_type == ParameterType::Object => {
            coerce(&text, schema, path, site)
        }
        Value::String(text) => coerce(&text, schema, key, site),
        Value::Object(map) => Ok(Coerced::plain(match &schema.properties {
            Some(properties) => Value::Object(coerce_members(map, properties, path, site)?),
            None => Value::Object(map),
        })),
        other => Ok(Coerced::plain(other)),
    }
}
