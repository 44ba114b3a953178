use super::definition::{OperationSchema, ParameterSchema, ParameterType};
use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::Deserialize;

/// Backend reply to an environment/interface selection.
#[derive(Debug, Deserialize, Clone)]
pub struct SelectionResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "functionsInfo")]
    pub functions_info: Vec<RawOperation>,
}

impl SelectionResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Operation as described by the backend, before validation.
#[derive(Debug, Deserialize, Clone)]
pub struct RawOperation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: IndexMap<String, RawParameter>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// Parameter as described by the backend, before validation.
#[derive(Debug, Deserialize, Clone)]
pub struct RawParameter {
    #[serde(rename = "type", default)]
    pub param_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Option<IndexMap<String, RawParameter>>,
}

/// Conversion from a backend payload into validated operation schemas.
///
/// Implemented for the selection envelope and for single raw operations, so
/// callers holding either shape get the same checks.
pub trait IntoOperations {
    fn into_operations(self) -> Result<Vec<OperationSchema>, SchemaError>;
}

impl IntoOperations for SelectionResponse {
    fn into_operations(self) -> Result<Vec<OperationSchema>, SchemaError> {
        self.functions_info
            .into_iter()
            .map(RawOperation::into_schema)
            .collect()
    }
}

impl IntoOperations for Vec<RawOperation> {
    fn into_operations(self) -> Result<Vec<OperationSchema>, SchemaError> {
        self.into_iter().map(RawOperation::into_schema).collect()
    }
}

impl RawOperation {
    pub fn into_schema(self) -> Result<OperationSchema, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::MissingName);
        }
        let mut parameters = IndexMap::with_capacity(self.parameters.len());
        for (param_name, raw) in self.parameters {
            let schema = convert_parameter(&self.name, &param_name, raw)?;
            parameters.insert(param_name, schema);
        }

        let operation = OperationSchema {
            name: self.name,
            description: self.description,
            parameters,
            required: self.required,
        };
        operation.validate()?;
        Ok(operation)
    }
}

fn convert_parameter(
    operation: &str,
    param_name: &str,
    raw: RawParameter,
) -> Result<ParameterSchema, SchemaError> {
    let param_type = ParameterType::from_name(raw.param_type.as_deref()).ok_or_else(|| {
        SchemaError::UnsupportedType {
            operation: operation.to_string(),
            parameter: param_name.to_string(),
            type_name: raw.param_type.clone().unwrap_or_default(),
        }
    })?;

    let properties = match (param_type, raw.properties) {
        (ParameterType::Object, Some(props)) if !props.is_empty() => {
            let mut nested = IndexMap::with_capacity(props.len());
            for (field, sub) in props {
                let path = format!("{}.{}", param_name, field);
                nested.insert(field, convert_parameter(operation, &path, sub)?);
            }
            Some(nested)
        }
        (ParameterType::Object, _) => None,
        (other, Some(_)) => {
            log::debug!(
                "Ignoring properties declared on {} parameter '{}' of '{}'",
                other,
                param_name,
                operation
            );
            None
        }
        (_, None) => None,
    };

    Ok(ParameterSchema {
        param_type,
        properties,
        description: raw.description,
    })
}
