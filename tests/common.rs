//! Common test utilities: operation fixtures and an in-memory backend.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;
use tasksmith::dispatch::{ExecuteRequest, ExecuteResponse, Transport};
use tasksmith::error::TransportError;
use tasksmith::prelude::*;
use tasksmith::schema::{IntoOperations, SelectionResponse};

/// Operations as the backend would describe them.
///
/// `update_record` has a required `number` parameter `amount`;
/// `get_subscription` exercises identifiers, nested objects and arrays.
pub fn operations_json() -> Value {
    json!([
        {
            "name": "update_record",
            "description": "Updates a record",
            "parameters": {
                "record_id": {"type": "string"},
                "amount": {"type": "number", "description": "Amount to book"},
                "note": {"type": "string"}
            },
            "required": ["record_id", "amount"]
        },
        {
            "name": "get_subscription",
            "description": "Looks up a subscription",
            "parameters": {
                "subscription_id": {"type": "number"},
                "include_history": {"type": "boolean"},
                "tags": {"type": "array"},
                "count": {"type": "integer"},
                "filters": {
                    "type": "object",
                    "properties": {
                        "min": {"type": "number"},
                        "active": {"type": "boolean"}
                    }
                }
            },
            "required": ["subscription_id"]
        }
    ])
}

pub fn operations() -> Vec<OperationSchema> {
    let raw: Vec<tasksmith::schema::RawOperation> =
        serde_json::from_value(operations_json()).unwrap();
    raw.into_operations().unwrap()
}

pub fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.load(operations()).unwrap();
    registry
}

/// A session with the fixture operations loaded for `retail`, interface 1.
pub fn session() -> SessionState {
    let mut session = SessionState::new();
    session.load_operations("retail", "1", operations()).unwrap();
    session
}

/// Adds an `update_record` action with the given inputs.
pub fn add_update_record(session: &mut SessionState, record_id: &str, amount: &str) -> ActionId {
    let id = session.add_action().unwrap();
    session.select_operation(id, "update_record").unwrap();
    session.set_raw_input(id, "record_id", record_id).unwrap();
    session.set_raw_input(id, "amount", amount).unwrap();
    id
}

/// In-memory backend that records every execute call.
pub struct MockTransport {
    pub selection_status: String,
    /// 1-based index of an execute call that fails with a 500.
    pub fail_on_call: Option<usize>,
    calls: Mutex<Vec<ExecuteRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            selection_status: "success".to_string(),
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<ExecuteRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn select_environment(
        &self,
        _environment: &str,
        _interface: &str,
    ) -> std::result::Result<SelectionResponse, TransportError> {
        let reply = json!({
            "status": self.selection_status,
            "message": "environment not found",
            "functions_info": operations_json()
        });
        serde_json::from_value(reply).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn execute(
        &self,
        request: &ExecuteRequest,
    ) -> std::result::Result<ExecuteResponse, TransportError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(TransportError::Status {
                status: 500,
                body: json!({"message": "boom"}),
            });
        }
        Ok(ExecuteResponse {
            output: json!({"api": request.api_name, "balance": 10}),
            float_fields: vec!["balance".to_string()],
        })
    }
}
