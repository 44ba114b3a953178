use crate::coercion::{self, CoercionSite};
use crate::error::CoercionError;
use crate::schema::OperationSchema;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

/// Session-local action identifier. Ids are handed out in increasing order and
/// never reused, even after the action is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) u64);

impl ActionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action_{}", self.0)
    }
}

/// Arguments produced by one coercion pass over an action's raw inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedArguments {
    /// Arguments in parameter declaration order.
    pub values: Map<String, Value>,
    /// Names of arguments to re-emit as `N.0`, in declaration order.
    pub float_fields: Vec<String>,
}

impl CoercedArguments {
    /// Required parameters whose coerced value is empty.
    pub fn missing_required(&self, operation: &OperationSchema) -> Vec<String> {
        operation
            .required
            .iter()
            .filter(|name| match self.values.get(name.as_str()) {
                None => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
            .cloned()
            .collect()
    }
}

/// One user-authored invocation of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInstance {
    pub(crate) id: ActionId,
    pub(crate) selected_operation: Option<String>,
    pub(crate) raw_inputs: IndexMap<String, String>,
    pub(crate) coerced_arguments: Map<String, Value>,
    pub(crate) float_flagged_arguments: Vec<String>,
    pub(crate) last_output: Value,
    pub(crate) output_float_fields: Vec<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) executed: bool,
    pub(crate) in_flight: bool,
}

impl ActionInstance {
    pub(crate) fn new(id: ActionId) -> Self {
        Self {
            id,
            selected_operation: None,
            raw_inputs: IndexMap::new(),
            coerced_arguments: Map::new(),
            float_flagged_arguments: Vec::new(),
            last_output: Value::String(String::new()),
            output_float_fields: Vec::new(),
            last_error: None,
            executed: false,
            in_flight: false,
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn selected_operation(&self) -> Option<&str> {
        self.selected_operation.as_deref()
    }

    /// Raw text per parameter, in declaration order.
    pub fn raw_inputs(&self) -> &IndexMap<String, String> {
        &self.raw_inputs
    }

    pub fn raw_input(&self, field: &str) -> Option<&str> {
        self.raw_inputs.get(field).map(String::as_str)
    }

    /// Arguments from the last successful execute-time coercion pass.
    pub fn coerced_arguments(&self) -> &Map<String, Value> {
        &self.coerced_arguments
    }

    pub fn float_flagged_arguments(&self) -> &[String] {
        &self.float_flagged_arguments
    }

    /// Output of the last successful execution, or an empty string.
    pub fn last_output(&self) -> &Value {
        &self.last_output
    }

    pub fn output_float_fields(&self) -> &[String] {
        &self.output_float_fields
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_executed(&self) -> bool {
        self.executed
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Runs the coercion engine over every declared parameter.
    ///
    /// At the canonical site empty inputs are omitted; at the execute site they
    /// are kept as empty strings. Nothing on the instance is modified.
    pub fn coerce_arguments(
        &self,
        operation: &OperationSchema,
        site: CoercionSite,
    ) -> Result<CoercedArguments, CoercionError> {
        let mut coerced = CoercedArguments::default();
        for (name, schema) in &operation.parameters {
            let raw = self.raw_input(name).unwrap_or_default();
            if site == CoercionSite::Canonical && raw.trim().is_empty() {
                continue;
            }
            let result = coercion::coerce(raw, schema, name, site)?;
            if result.float_flagged {
                coerced.float_fields.push(name.clone());
            }
            coerced.values.insert(name.clone(), result.value);
        }
        Ok(coerced)
    }
}
