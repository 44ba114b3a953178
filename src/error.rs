use crate::action::ActionId;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while validating operation schemas received from the backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Parameter '{parameter}' of operation '{operation}' has an unsupported type '{type_name}'")]
    UnsupportedType {
        operation: String,
        parameter: String,
        type_name: String,
    },

    #[error(
        "Operation '{operation}' marks '{parameter}' as required, but declares no such parameter"
    )]
    UndeclaredRequired {
        operation: String,
        parameter: String,
    },

    #[error("Operation '{0}' is declared more than once")]
    DuplicateOperation(String),

    #[error("An operation was declared without a name")]
    MissingName,
}

/// Hard failures of the type coercion engine. Every other malformed input
/// degrades to a string value instead of raising.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("Parameter '{field}' must be valid JSON: {message}")]
    InvalidJsonParameter { field: String, message: String },
}

/// Errors raised by the action store and the local checks that run before any
/// network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("Please select an environment and interface first")]
    ConfigurationMissing,

    #[error("Action '{0}' does not exist")]
    ActionNotFound(ActionId),

    #[error("Action '{0}' has no operation selected")]
    OperationNotSelected(ActionId),

    #[error("Operation '{0}' is not available for the selected environment and interface")]
    UnknownOperation(String),

    #[error("Operation '{operation}' has no parameter named '{parameter}'")]
    UnknownParameter {
        operation: String,
        parameter: String,
    },

    #[error("Please fill in all required fields of '{action}': {}", fields.join(", "))]
    MissingRequiredParameter { action: ActionId, fields: Vec<String> },

    #[error("Action '{0}' is already executing")]
    AlreadyExecuting(ActionId),

    #[error("No actions to execute")]
    NoActions,

    #[error("Action {position} doesn't have an operation selected")]
    IncompleteBatch { position: usize },

    #[error("Please import a task first to compare it with the current task")]
    NoBaseline,

    #[error("{count} action(s) have not been executed yet; run all actions before comparing")]
    UnexecutedActions { count: usize },

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

/// Errors raised when a task document cannot be imported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error(
        "The imported actions are for the interface {document} whereas the session is using interface {active}"
    )]
    InterfaceMismatch { document: String, active: String },

    #[error(
        "The imported actions are for the environment '{document}' whereas the session is using '{active}'"
    )]
    EnvironmentMismatch { document: String, active: String },

    #[error("Invalid task document: {0}")]
    InvalidDocument(String),

    #[error("Failed to parse task JSON: {0}")]
    Json(String),

    #[error("{0}")]
    Io(String),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Json(err.to_string())
    }
}

/// Errors raised while building or importing an edge graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error(
        "Edge '{from}' -> '{to}' connects {inputs} input field(s) to {outputs} output field(s)"
    )]
    FieldCountMismatch {
        from: String,
        to: String,
        inputs: usize,
        outputs: usize,
    },

    #[error("Invalid graph document: {0}")]
    InvalidDocument(String),

    #[error("No actions with selected operations found")]
    NoSelectedOperations,
}

/// Failures reaching the backend. These never propagate out of the dispatcher;
/// they are folded into a failed execution outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Failed to connect to the server: {0}")]
    Network(String),

    #[error("Backend answered with status {status}: {body}")]
    Status { status: u16, body: Value },

    #[error("Could not decode the backend response: {0}")]
    Decode(String),
}

/// Errors raised while choosing an environment and interface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("Please enter an environment name")]
    MissingEnvironment,

    #[error("Please select an interface")]
    MissingInterface,

    #[error("Failed to select environment and interface: {0}")]
    Rejected(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
