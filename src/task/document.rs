use super::serialize::to_pretty_string;
use crate::error::ImportError;
use crate::graph::Edge;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

const TOP_LEVEL_KEYS: [&str; 6] = [
    "env",
    "model_provider",
    "model",
    "num_trials",
    "temperature",
    "interface_num",
];
const TASK_KEYS: [&str; 2] = ["user_id", "instruction"];

/// Session-level fields carried alongside the action list.
///
/// Values are kept as the JSON they were read as, so a temperature of `0.0`
/// or a numeric user id survives a round trip unchanged. A key that was
/// present with `null` is `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMetadata {
    pub env: Option<Value>,
    pub model_provider: Option<Value>,
    pub model: Option<Value>,
    pub num_trials: Option<Value>,
    pub temperature: Option<Value>,
    pub interface_num: Option<Value>,
    pub user_id: Option<Value>,
    pub instruction: Option<Value>,
}

impl SessionMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(Value::String(env.into()));
        self
    }

    pub fn with_interface(mut self, interface: impl Into<Value>) -> Self {
        self.interface_num = Some(interface.into());
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(Value::String(instruction.into()));
        self
    }

    pub fn env_name(&self) -> Option<&str> {
        self.env.as_ref().and_then(Value::as_str)
    }

    fn field(&self, key: &str) -> Option<&Value> {
        match key {
            "env" => self.env.as_ref(),
            "model_provider" => self.model_provider.as_ref(),
            "model" => self.model.as_ref(),
            "num_trials" => self.num_trials.as_ref(),
            "temperature" => self.temperature.as_ref(),
            "interface_num" => self.interface_num.as_ref(),
            "user_id" => self.user_id.as_ref(),
            "instruction" => self.instruction.as_ref(),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut Option<Value>> {
        match key {
            "env" => Some(&mut self.env),
            "model_provider" => Some(&mut self.model_provider),
            "model" => Some(&mut self.model),
            "num_trials" => Some(&mut self.num_trials),
            "temperature" => Some(&mut self.temperature),
            "interface_num" => Some(&mut self.interface_num),
            "user_id" => Some(&mut self.user_id),
            "instruction" => Some(&mut self.instruction),
            _ => None,
        }
    }
}

/// One entry of a task's action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAction {
    pub name: String,
    /// Typed arguments, possibly carrying a `_floatFields` marker.
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(default = "empty_output")]
    pub output: Value,
}

fn empty_output() -> Value {
    Value::String(String::new())
}

/// Layout a document was read in, re-used when it is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentShape {
    /// `{env, ..., actions, edges}`
    #[default]
    Flat,
    /// `{env, ..., task: {user_id, instruction, actions, edges}}`
    Nested,
}

/// The canonical serializable task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDocument {
    pub shape: DocumentShape,
    pub metadata: SessionMetadata,
    pub actions: Vec<TaskAction>,
    pub edges: Option<Vec<Edge>>,
    /// Top-level keys this crate does not interpret.
    pub extra: Map<String, Value>,
    /// Keys of the nested `task` object this crate does not interpret.
    pub task_extra: Map<String, Value>,
}

impl TaskDocument {
    pub fn new(metadata: SessionMetadata, actions: Vec<TaskAction>, edges: Option<Vec<Edge>>) -> Self {
        Self {
            metadata,
            actions,
            edges,
            ..Self::default()
        }
    }

    pub fn with_shape(mut self, shape: DocumentShape) -> Self {
        self.shape = shape;
        self
    }

    /// The JSON form in the document's own shape, markers included.
    pub fn to_value(&self) -> Value {
        self.to_value_in(self.shape)
    }

    /// The JSON form in the given shape, markers included.
    pub fn to_value_in(&self, shape: DocumentShape) -> Value {
        let mut root = Map::new();
        for key in TOP_LEVEL_KEYS {
            if let Some(value) = self.metadata.field(key) {
                root.insert(key.to_string(), value.clone());
            }
        }

        let actions = Value::Array(
            self.actions
                .iter()
                .map(|action| {
                    let mut entry = Map::new();
                    entry.insert("name".to_string(), Value::String(action.name.clone()));
                    entry.insert("arguments".to_string(), Value::Object(action.arguments.clone()));
                    entry.insert("output".to_string(), action.output.clone());
                    Value::Object(entry)
                })
                .collect(),
        );
        let edges = self.edges.as_ref().map(|edges| {
            Value::Array(
                edges
                    .iter()
                    .filter_map(|edge| serde_json::to_value(edge).ok())
                    .collect(),
            )
        });

        match shape {
            DocumentShape::Flat => {
                for key in TASK_KEYS {
                    if let Some(value) = self.metadata.field(key) {
                        root.insert(key.to_string(), value.clone());
                    }
                }
                root.insert("actions".to_string(), actions);
                if let Some(edges) = edges {
                    root.insert("edges".to_string(), edges);
                }
            }
            DocumentShape::Nested => {
                let mut task = Map::new();
                for key in TASK_KEYS {
                    if let Some(value) = self.metadata.field(key) {
                        task.insert(key.to_string(), value.clone());
                    }
                }
                task.insert("actions".to_string(), actions);
                if let Some(edges) = edges {
                    task.insert("edges".to_string(), edges);
                }
                task.extend(self.task_extra.clone());
                root.insert("task".to_string(), Value::Object(task));
            }
        }
        root.extend(self.extra.clone());
        Value::Object(root)
    }

    /// Float-aware, pretty-printed JSON text.
    pub fn export(&self) -> String {
        to_pretty_string(&self.to_value())
    }

    /// The interface the document was authored for, from `interface_num` or
    /// `task.interface_num`.
    pub fn declared_interface(&self) -> Option<&Value> {
        self.metadata
            .interface_num
            .as_ref()
            .filter(|v| !v.is_null())
            .or_else(|| self.task_extra.get("interface_num"))
    }

    /// Refuses documents authored for another environment or interface.
    ///
    /// Interfaces are compared by their leading integer when both sides have
    /// one, so `2`, `"2"` and `"2 (beta)"` all match an active interface of `"2"`.
    pub fn check_compatibility(
        &self,
        active_env: Option<&str>,
        active_interface: Option<&str>,
    ) -> Result<(), ImportError> {
        if let (Some(declared), Some(active)) = (self.declared_interface(), active_interface) {
            if is_declared(declared) && !same_interface(declared, active) {
                log::warn!("Refusing import: interface {} != {}", display(declared), active);
                return Err(ImportError::InterfaceMismatch {
                    document: display(declared),
                    active: active.trim().to_string(),
                });
            }
        }
        if let (Some(declared), Some(active)) = (self.metadata.env_name(), active_env) {
            let (declared, active) = (declared.trim(), active.trim());
            if !declared.is_empty() && !active.is_empty() && declared != active {
                log::warn!("Refusing import: environment '{}' != '{}'", declared, active);
                return Err(ImportError::EnvironmentMismatch {
                    document: declared.to_string(),
                    active: active.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Writes the exported text to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ImportError> {
        let path = path.as_ref();
        fs::write(path, self.export()).map_err(|e| {
            ImportError::Io(format!("Could not write to file '{}': {}", path.display(), e))
        })
    }

    /// Reads and parses a task document from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ImportError::Io(format!("Could not open file '{}': {}", path.display(), e))
        })?;
        parse_str(&text)
    }
}

/// Parses task JSON text.
pub fn parse_str(text: &str) -> Result<TaskDocument, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    parse_document(&value)
}

/// Normalizes either accepted document layout into a [`TaskDocument`].
///
/// Values are kept exactly as parsed, `_floatFields` markers included.
pub fn parse_document(value: &Value) -> Result<TaskDocument, ImportError> {
    let root = value
        .as_object()
        .ok_or_else(|| ImportError::InvalidDocument("expected a JSON object".to_string()))?;

    let nested = root.get("task").and_then(Value::as_object);
    let (shape, container) = match (root.get("actions"), nested) {
        (Some(Value::Array(_)), _) => (DocumentShape::Flat, root),
        (_, Some(task)) if task.get("actions").is_some_and(Value::is_array) => {
            (DocumentShape::Nested, task)
        }
        _ => {
            return Err(ImportError::InvalidDocument(
                "neither 'actions' nor 'task.actions' is a list".to_string(),
            ));
        }
    };

    let mut document = TaskDocument {
        shape,
        ..TaskDocument::default()
    };
    document.actions = serde_json::from_value(container["actions"].clone())
        .map_err(|e| ImportError::InvalidDocument(format!("actions: {}", e)))?;
    document.edges = match container.get("edges") {
        None | Some(Value::Null) => None,
        Some(edges) => Some(
            serde_json::from_value(edges.clone())
                .map_err(|e| ImportError::InvalidDocument(format!("edges: {}", e)))?,
        ),
    };

    for (key, value) in root {
        if shape == DocumentShape::Nested && key == "task" {
            continue;
        }
        if shape == DocumentShape::Flat && (key == "actions" || key == "edges") {
            continue;
        }
        let is_meta = TOP_LEVEL_KEYS.contains(&key.as_str())
            || (shape == DocumentShape::Flat && TASK_KEYS.contains(&key.as_str()));
        match document.metadata.field_mut(key) {
            Some(slot) if is_meta => *slot = Some(value.clone()),
            _ => {
                document.extra.insert(key.clone(), value.clone());
            }
        }
    }

    if shape == DocumentShape::Nested {
        for (key, value) in container {
            if key == "actions" || key == "edges" {
                continue;
            }
            match document.metadata.field_mut(key) {
                Some(slot) if TASK_KEYS.contains(&key.as_str()) => *slot = Some(value.clone()),
                _ => {
                    document.task_extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    Ok(document)
}

fn is_declared(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Leading integer of a value, ignoring anything after the digits.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits_start = usize::from(text.starts_with(['-', '+']));
    let end = text[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |i| i + digits_start);
    if end == digits_start {
        return None;
    }
    text[..end].parse().ok()
}

fn same_interface(declared: &Value, active: &str) -> bool {
    let declared_number = match declared {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    };
    match (declared_number, leading_integer(active)) {
        (Some(a), Some(b)) => a == b,
        _ => display(declared) == active.trim(),
    }
}
