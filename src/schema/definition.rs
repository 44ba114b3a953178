use crate::error::SchemaError;
use indexmap::IndexMap;
use std::fmt;

/// The declared type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    String,
    Number,
    /// Coerces like `Number`, but a bare integer is never float-flagged.
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    /// Resolves a backend type name. A missing name means `string`.
    pub fn from_name(name: Option<&str>) -> Option<Self> {
        match name {
            None => Some(ParameterType::String),
            Some("string") => Some(ParameterType::String),
            Some("number") => Some(ParameterType::Number),
            Some("integer") => Some(ParameterType::Integer),
            Some("boolean") => Some(ParameterType::Boolean),
            Some("array") => Some(ParameterType::Array),
            Some("object") => Some(ParameterType::Object),
            Some(_) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ParameterType::Number | ParameterType::Integer)
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Describes one parameter of an operation.
///
/// `properties` is only ever set on `Object` parameters that declare at least
/// one sub-field. An object without properties is opaque: its text is parsed
/// as JSON and passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    pub param_type: ParameterType,
    pub properties: Option<IndexMap<String, ParameterSchema>>,
    pub description: Option<String>,
}

impl ParameterSchema {
    pub fn new(param_type: ParameterType) -> Self {
        Self {
            param_type,
            properties: None,
            description: None,
        }
    }

    /// An object parameter with declared sub-fields. An empty map yields an opaque object.
    pub fn object(properties: IndexMap<String, ParameterSchema>) -> Self {
        Self {
            param_type: ParameterType::Object,
            properties: (!properties.is_empty()).then_some(properties),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Placeholder text shown for the input field.
    pub fn placeholder(&self, name: &str) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Enter {}", name))
    }
}

/// A named, backend-declared callable with a typed parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSchema {
    pub name: String,
    pub description: String,
    /// Parameters in declaration order.
    pub parameters: IndexMap<String, ParameterSchema>,
    pub required: Vec<String>,
}

impl OperationSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: IndexMap::new(),
            required: Vec::new(),
        }
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        schema: ParameterSchema,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.parameters.insert(name, schema);
        self
    }

    pub fn is_required(&self, parameter: &str) -> bool {
        self.required.iter().any(|r| r == parameter)
    }

    /// Checks that every required name is a declared parameter.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::MissingName);
        }
        if let Some(missing) = self
            .required
            .iter()
            .find(|r| !self.parameters.contains_key(r.as_str()))
        {
            return Err(SchemaError::UndeclaredRequired {
                operation: self.name.clone(),
                parameter: missing.clone(),
            });
        }
        Ok(())
    }
}
