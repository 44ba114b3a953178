use super::FLOAT_FIELDS_KEY;
use super::document::{SessionMetadata, TaskAction, TaskDocument};
use crate::action::{ActionInstance, ActionStore};
use crate::coercion::CoercionSite;
use crate::error::TaskError;
use crate::graph::Edge;
use crate::schema::SchemaRegistry;
use serde_json::Value;

/// Reconstructs the canonical action list from the store, in store order.
///
/// Actions without a selected operation are skipped. Empty inputs are left
/// out of the arguments.
pub fn build_actions(
    store: &ActionStore,
    registry: &SchemaRegistry,
) -> Result<Vec<TaskAction>, TaskError> {
    store
        .iter()
        .filter(|instance| instance.selected_operation().is_some())
        .map(|instance| build_action(instance, registry))
        .collect()
}

pub fn build_document(
    metadata: SessionMetadata,
    store: &ActionStore,
    registry: &SchemaRegistry,
    edges: Option<Vec<Edge>>,
) -> Result<TaskDocument, TaskError> {
    let actions = build_actions(store, registry)?;
    log::debug!("Built task document with {} action(s)", actions.len());
    Ok(TaskDocument::new(metadata, actions, edges))
}

fn build_action(instance: &ActionInstance, registry: &SchemaRegistry) -> Result<TaskAction, TaskError> {
    let name = instance
        .selected_operation()
        .ok_or(TaskError::OperationNotSelected(instance.id()))?;
    let operation = registry
        .get(name)
        .ok_or_else(|| TaskError::UnknownOperation(name.to_string()))?;

    let coerced = instance.coerce_arguments(operation, CoercionSite::Canonical)?;
    let mut arguments = coerced.values;
    if !coerced.float_fields.is_empty() {
        arguments.insert(FLOAT_FIELDS_KEY.to_string(), marker(&coerced.float_fields));
    }

    let mut output = instance.last_output().clone();
    if let Value::Object(map) = &mut output {
        if !instance.output_float_fields().is_empty() {
            map.insert(
                FLOAT_FIELDS_KEY.to_string(),
                marker(instance.output_float_fields()),
            );
        }
    }

    Ok(TaskAction {
        name: operation.name.clone(),
        arguments,
        output,
    })
}

fn marker(names: &[String]) -> Value {
    Value::Array(names.iter().cloned().map(Value::String).collect())
}
