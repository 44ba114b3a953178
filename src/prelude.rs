//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need to select an environment, author
//! and run actions, and move task documents in and out of a session.
//!
//! # Example
//!
//! ```rust,no_run
//! use tasksmith::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let document = TaskDocument::from_file("path/to/task.json")?;
//! println!("{}", document.export());
//! # Ok(())
//! # }
//! ```

// Session and actions
pub use crate::action::{ActionId, ActionInstance};
pub use crate::session::SessionState;

// Schemas and coercion
pub use crate::coercion::{Coerced, CoercionSite, coerce};
pub use crate::schema::{OperationSchema, ParameterSchema, ParameterType, SchemaRegistry};

// Task documents and graphs
pub use crate::graph::{Edge, EdgeGraph};
pub use crate::task::{SessionMetadata, TaskAction, TaskDiff, TaskDocument, parse_document};

// Execution
pub use crate::dispatch::{
    BatchSummary, ClientConfig, Dispatcher, ExecutionOutcome, HttpTransport, Transport,
};

// Error types
pub use crate::error::{
    CoercionError, GraphError, ImportError, SchemaError, SelectionError, TaskError,
    TransportError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
