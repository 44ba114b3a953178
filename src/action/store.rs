use super::instance::{ActionId, ActionInstance};
use crate::coercion::CoercionSite;
use crate::dispatch::{ExecuteRequest, ExecutionOutcome};
use crate::error::TaskError;
use crate::schema::SchemaRegistry;
use crate::task::FLOAT_FIELDS_KEY;
use serde_json::Value;

/// Ordered collection of the actions authored in a session.
///
/// Iteration order is authoring order, which is also the order actions appear
/// in the exported task and the order batch execution runs them.
#[derive(Debug, Default, Clone)]
pub struct ActionStore {
    actions: Vec<ActionInstance>,
    next_id: u64,
}

impl ActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new, empty action. Fails while no operations are loaded.
    pub fn add_instance(&mut self, registry: &SchemaRegistry) -> Result<ActionId, TaskError> {
        if registry.is_empty() {
            log::warn!("Refusing to add an action before any operation schema is loaded");
            return Err(TaskError::ConfigurationMissing);
        }
        self.next_id += 1;
        let id = ActionId(self.next_id);
        self.actions.push(ActionInstance::new(id));
        log::debug!("Added {}", id);
        Ok(id)
    }

    pub fn remove_instance(&mut self, id: ActionId) -> Result<ActionInstance, TaskError> {
        let position = self.position(id).ok_or(TaskError::ActionNotFound(id))?;
        Ok(self.actions.remove(position))
    }

    /// Points an action at an operation and resets its inputs to one empty
    /// field per declared parameter. Output from a previous run is dropped.
    pub fn select_operation(
        &mut self,
        id: ActionId,
        operation_name: &str,
        registry: &SchemaRegistry,
    ) -> Result<(), TaskError> {
        let operation = registry
            .get(operation_name)
            .ok_or_else(|| TaskError::UnknownOperation(operation_name.to_string()))?;
        let instance = self.get_mut(id)?;
        if instance.in_flight {
            return Err(TaskError::AlreadyExecuting(id));
        }

        instance.selected_operation = Some(operation.name.clone());
        instance.raw_inputs = operation
            .parameters
            .keys()
            .map(|name| (name.clone(), String::new()))
            .collect();
        instance.coerced_arguments.clear();
        instance.float_flagged_arguments.clear();
        instance.last_output = Value::String(String::new());
        instance.output_float_fields.clear();
        instance.last_error = None;
        instance.executed = false;
        Ok(())
    }

    pub fn set_raw_input(
        &mut self,
        id: ActionId,
        field: &str,
        text: impl Into<String>,
    ) -> Result<(), TaskError> {
        let instance = self.get_mut(id)?;
        let operation = instance
            .selected_operation
            .clone()
            .ok_or(TaskError::OperationNotSelected(id))?;
        match instance.raw_inputs.get_mut(field) {
            Some(slot) => {
                *slot = text.into();
                Ok(())
            }
            None => Err(TaskError::UnknownParameter {
                operation,
                parameter: field.to_string(),
            }),
        }
    }

    /// Stores a successful result. A `_floatFields` marker inside an object
    /// output is folded into the float field list so it never sits in live state.
    pub fn record_execution_result(
        &mut self,
        id: ActionId,
        output: Value,
        float_fields: Vec<String>,
    ) -> Result<(), TaskError> {
        let (output, fields) = fold_output_marker(output, float_fields);
        let instance = self.get_mut(id)?;
        instance.last_output = output;
        instance.output_float_fields = fields;
        instance.last_error = None;
        instance.executed = true;
        Ok(())
    }

    /// Restores an output read from a task document. The action still counts
    /// as not executed in this session.
    pub fn restore_output(&mut self, id: ActionId, output: Value) -> Result<(), TaskError> {
        let (output, fields) = fold_output_marker(output, Vec::new());
        let instance = self.get_mut(id)?;
        instance.last_output = output;
        instance.output_float_fields = fields;
        Ok(())
    }

    /// Stores a failed run. The previous output no longer describes the action.
    pub fn record_execution_failure(
        &mut self,
        id: ActionId,
        message: impl Into<String>,
    ) -> Result<(), TaskError> {
        let instance = self.get_mut(id)?;
        instance.last_output = Value::String(String::new());
        instance.output_float_fields.clear();
        instance.last_error = Some(message.into());
        instance.executed = false;
        Ok(())
    }

    /// Validates an action locally and marks it in flight.
    ///
    /// Every check that can fail without the backend happens here: operation
    /// selected and still registered, object parameters parse, required fields
    /// filled. On any error the instance is left untouched.
    pub fn begin_execution(
        &mut self,
        id: ActionId,
        registry: &SchemaRegistry,
        environment: &str,
    ) -> Result<ExecuteRequest, TaskError> {
        let instance = self.get(id).ok_or(TaskError::ActionNotFound(id))?;
        if instance.in_flight {
            return Err(TaskError::AlreadyExecuting(id));
        }
        let operation_name = instance
            .selected_operation
            .as_deref()
            .ok_or(TaskError::OperationNotSelected(id))?;
        let operation = registry
            .get(operation_name)
            .ok_or_else(|| TaskError::UnknownOperation(operation_name.to_string()))?;

        let coerced = instance.coerce_arguments(operation, CoercionSite::Execute)?;
        let missing = coerced.missing_required(operation);
        if !missing.is_empty() {
            return Err(TaskError::MissingRequiredParameter {
                action: id,
                fields: missing,
            });
        }

        let request = ExecuteRequest {
            api_name: operation.name.clone(),
            parameters: coerced.values.clone(),
            environment: environment.to_string(),
        };
        let instance = self.get_mut(id)?;
        instance.coerced_arguments = coerced.values;
        instance.float_flagged_arguments = coerced.float_fields;
        instance.in_flight = true;
        Ok(request)
    }

    /// Clears the in-flight mark and records the outcome.
    pub fn finish_execution(
        &mut self,
        id: ActionId,
        outcome: &ExecutionOutcome,
    ) -> Result<(), TaskError> {
        self.get_mut(id)?.in_flight = false;
        match outcome {
            ExecutionOutcome::Completed {
                output,
                float_fields,
            } => self.record_execution_result(id, output.clone(), float_fields.clone()),
            ExecutionOutcome::Failed { error } => self.record_execution_failure(id, error.to_string()),
        }
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionInstance> {
        self.actions.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: ActionId) -> Result<&mut ActionInstance, TaskError> {
        self.actions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(TaskError::ActionNotFound(id))
    }

    pub fn position(&self, id: ActionId) -> Option<usize> {
        self.actions.iter().position(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionInstance> {
        self.actions.iter()
    }

    pub fn ids(&self) -> Vec<ActionId> {
        self.actions.iter().map(|a| a.id).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn fold_output_marker(mut output: Value, mut fields: Vec<String>) -> (Value, Vec<String>) {
    if let Value::Object(map) = &mut output {
        if let Some(Value::Array(marked)) = map.remove(FLOAT_FIELDS_KEY) {
            for name in marked.into_iter().filter_map(|v| v.as_str().map(String::from)) {
                if !fields.contains(&name) {
                    fields.push(name);
                }
            }
        }
    }
    (output, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{OperationSchema, ParameterSchema, ParameterType};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .load(vec![
                OperationSchema::new("update_record", "Updates a record")
                    .with_parameter("record_id", ParameterSchema::new(ParameterType::String), true)
                    .with_parameter("amount", ParameterSchema::new(ParameterType::Number), true)
                    .with_parameter(
                        "details",
                        ParameterSchema::object(
                            [("count".to_string(), ParameterSchema::new(ParameterType::Integer))]
                                .into_iter()
                                .collect(),
                        ),
                        false,
                    ),
            ])
            .unwrap();
        registry
    }

    #[test]
    fn test_ids_are_never_reused() {
        let registry = registry();
        let mut store = ActionStore::new();
        let first = store.add_instance(&registry).unwrap();
        let second = store.add_instance(&registry).unwrap();
        store.remove_instance(second).unwrap();
        let third = store.add_instance(&registry).unwrap();

        assert_ne!(second, third);
        assert!(third > second);
        assert_eq!(store.ids(), vec![first, third]);
        assert_eq!(third.to_string(), "action_3");
    }

    #[test]
    fn test_add_requires_loaded_registry() {
        let mut store = ActionStore::new();
        assert_eq!(
            store.add_instance(&SchemaRegistry::new()),
            Err(TaskError::ConfigurationMissing)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_select_operation_resets_inputs() {
        let registry = registry();
        let mut store = ActionStore::new();
        let id = store.add_instance(&registry).unwrap();
        store.select_operation(id, "update_record", &registry).unwrap();
        store.set_raw_input(id, "amount", "12").unwrap();
        store.select_operation(id, "update_record", &registry).unwrap();

        let instance = store.get(id).unwrap();
        let names: Vec<_> = instance.raw_inputs().keys().cloned().collect();
        assert_eq!(names, vec!["record_id", "amount", "details"]);
        assert_eq!(instance.raw_input("amount"), Some(""));
        assert!(matches!(
            store.set_raw_input(id, "nope", "1"),
            Err(TaskError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn test_begin_execution_guards() {
        let registry = registry();
        let mut store = ActionStore::new();
        let id = store.add_instance(&registry).unwrap();
        assert_eq!(
            store.begin_execution(id, &registry, "env").unwrap_err(),
            TaskError::OperationNotSelected(id)
        );

        store.select_operation(id, "update_record", &registry).unwrap();
        store.set_raw_input(id, "record_id", "r-1").unwrap();
        match store.begin_execution(id, &registry, "env") {
            Err(TaskError::MissingRequiredParameter { fields, .. }) => {
                assert_eq!(fields, vec!["amount".to_string()])
            }
            other => panic!("Expected MissingRequiredParameter, got {:?}", other),
        }

        store.set_raw_input(id, "amount", "25").unwrap();
        store.set_raw_input(id, "details", "{bad json").unwrap();
        assert!(matches!(
            store.begin_execution(id, &registry, "env"),
            Err(TaskError::Coercion(_))
        ));
        assert!(store.get(id).unwrap().coerced_arguments().is_empty());

        store.set_raw_input(id, "details", r#"{"count": "3"}"#).unwrap();
        let request = store.begin_execution(id, &registry, "env").unwrap();
        assert_eq!(request.parameters["amount"], json!(25));
        assert_eq!(request.parameters["details"], json!({"count": 3}));
        assert_eq!(store.get(id).unwrap().float_flagged_arguments(), ["amount"]);
        assert_eq!(
            store.begin_execution(id, &registry, "env").unwrap_err(),
            TaskError::AlreadyExecuting(id)
        );
    }

    #[test]
    fn test_result_marker_is_folded_into_float_fields() {
        let registry = registry();
        let mut store = ActionStore::new();
        let id = store.add_instance(&registry).unwrap();
        store
            .record_execution_result(
                id,
                json!({"balance": 10, "_floatFields": ["balance"]}),
                vec![],
            )
            .unwrap();
        let instance = store.get(id).unwrap();
        assert_eq!(instance.last_output(), &json!({"balance": 10}));
        assert_eq!(instance.output_float_fields(), ["balance"]);

        store.record_execution_failure(id, "boom").unwrap();
        let instance = store.get(id).unwrap();
        assert_eq!(instance.last_output(), &json!(""));
        assert_eq!(instance.last_error(), Some("boom"));
    }
}
