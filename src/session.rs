use crate::action::{ActionId, ActionInstance, ActionStore};
use crate::dispatch::{ExecuteRequest, ExecutionOutcome, Transport};
use crate::error::{GraphError, ImportError, SchemaError, SelectionError, TaskError};
use crate::graph::EdgeGraph;
use crate::schema::{IntoOperations, OperationSchema, SchemaRegistry};
use crate::task::{
    self, DocumentShape, TaskDiff, TaskDocument, build_actions, render, to_pretty_string,
};
use serde_json::{Map, Value};

/// All state of one authoring session, owned by a single controller.
///
/// Every mutation goes through `&mut self`, so there is never more than one
/// writer. The in-flight flag on each action guards the gap between
/// [`prepare_execution`](Self::prepare_execution) and
/// [`complete_execution`](Self::complete_execution).
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    environment: Option<String>,
    interface: Option<String>,
    metadata: task::SessionMetadata,
    registry: SchemaRegistry,
    store: ActionStore,
    graph: EdgeGraph,
    baseline: Option<TaskDocument>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    pub fn metadata(&self) -> &task::SessionMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut task::SessionMetadata {
        &mut self.metadata
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ActionStore {
        &self.store
    }

    pub fn action(&self, id: ActionId) -> Option<&ActionInstance> {
        self.store.get(id)
    }

    pub fn graph(&self) -> &EdgeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut EdgeGraph {
        &mut self.graph
    }

    /// The last imported document, compared against by [`task_diff`](Self::task_diff).
    pub fn baseline(&self) -> Option<&TaskDocument> {
        self.baseline.as_ref()
    }

    /// Asks the backend for the operations of an environment and interface and
    /// replaces the registry with them. The registry is untouched on failure.
    pub async fn select_environment<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        environment: &str,
        interface: &str,
    ) -> Result<usize, SelectionError> {
        let environment = environment.trim();
        let interface = interface.trim();
        if environment.is_empty() {
            return Err(SelectionError::MissingEnvironment);
        }
        if interface.is_empty() {
            return Err(SelectionError::MissingInterface);
        }

        log::info!("Selecting environment '{}' with interface {}", environment, interface);
        let response = transport.select_environment(environment, interface).await?;
        if !response.is_success() {
            let reason = response.message.clone().unwrap_or(response.status.clone());
            log::warn!("Environment selection rejected: {}", reason);
            return Err(SelectionError::Rejected(reason));
        }
        let operations = response.into_operations()?;
        Ok(self.load_operations(environment, interface, operations)?)
    }

    /// Installs operations for an environment and interface without a backend call.
    pub fn load_operations(
        &mut self,
        environment: &str,
        interface: &str,
        operations: Vec<OperationSchema>,
    ) -> Result<usize, SchemaError> {
        self.registry.load(operations)?;
        self.environment = Some(environment.to_string());
        self.interface = Some(interface.to_string());
        self.metadata.env = Some(Value::String(environment.to_string()));
        self.metadata.interface_num = Some(
            interface
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(interface.to_string())),
        );
        Ok(self.registry.len())
    }

    pub fn add_action(&mut self) -> Result<ActionId, TaskError> {
        self.store.add_instance(&self.registry)
    }

    pub fn remove_action(&mut self, id: ActionId) -> Result<(), TaskError> {
        self.store.remove_instance(id).map(|_| ())
    }

    pub fn select_operation(&mut self, id: ActionId, operation: &str) -> Result<(), TaskError> {
        self.store.select_operation(id, operation, &self.registry)
    }

    pub fn set_raw_input(
        &mut self,
        id: ActionId,
        field: &str,
        text: impl Into<String>,
    ) -> Result<(), TaskError> {
        self.store.set_raw_input(id, field, text)
    }

    /// Validates an action, marks it in flight and returns the request to send.
    pub fn prepare_execution(&mut self, id: ActionId) -> Result<ExecuteRequest, TaskError> {
        let environment = self
            .environment
            .clone()
            .ok_or(TaskError::ConfigurationMissing)?;
        self.store.begin_execution(id, &self.registry, &environment)
    }

    pub fn complete_execution(
        &mut self,
        id: ActionId,
        outcome: &ExecutionOutcome,
    ) -> Result<(), TaskError> {
        self.store.finish_execution(id, outcome)
    }

    /// Reconstructs the canonical document from the current actions.
    ///
    /// Edges come from the graph when it has any, otherwise from the imported
    /// document. The imported document's layout is kept.
    pub fn build_document(&self) -> Result<TaskDocument, TaskError> {
        let edges = if self.graph.edge_count() > 0 {
            Some(self.graph.export())
        } else {
            self.baseline.as_ref().and_then(|b| b.edges.clone())
        };
        let mut document = task::build_document(self.metadata.clone(), &self.store, &self.registry, edges)?;
        if let Some(baseline) = &self.baseline {
            document.shape = baseline.shape;
            document.extra = baseline.extra.clone();
            document.task_extra = baseline.task_extra.clone();
        }
        Ok(document)
    }

    pub fn export(&self) -> Result<String, TaskError> {
        Ok(self.build_document()?.export())
    }

    pub fn check_import(&self, document: &TaskDocument) -> Result<(), ImportError> {
        document.check_compatibility(self.environment(), self.interface())
    }

    /// Loads a document into the session: one new action per document action,
    /// with inputs filled from its arguments and its recorded output kept. The document also becomes the
    /// diff baseline and its edges replace the graph.
    ///
    /// Every check runs before anything is changed, so a refused import leaves
    /// the session as it was.
    pub fn import_document(&mut self, document: TaskDocument) -> Result<Vec<ActionId>, ImportError> {
        self.check_import(&document)?;
        if self.registry.is_empty() {
            return Err(TaskError::ConfigurationMissing.into());
        }
        if let Some(missing) = document
            .actions
            .iter()
            .find(|action| !self.registry.contains(&action.name))
        {
            return Err(TaskError::UnknownOperation(missing.name.clone()).into());
        }
        let graph = match &document.edges {
            Some(edges) => Some(EdgeGraph::from_edges(edges)?),
            None => None,
        };

        let mut ids = Vec::with_capacity(document.actions.len());
        for action in &document.actions {
            let id = self.store.add_instance(&self.registry)?;
            self.store.select_operation(id, &action.name, &self.registry)?;
            for (field, text) in raw_inputs_from_arguments(&action.arguments) {
                if self.store.get(id).is_some_and(|a| a.raw_input(&field).is_some()) {
                    self.store.set_raw_input(id, &field, text)?;
                } else {
                    log::debug!("Ignoring undeclared argument '{}' of '{}'", field, action.name);
                }
            }
            self.store.restore_output(id, action.output.clone())?;
            ids.push(id);
        }

        let mut metadata = document.metadata.clone();
        if metadata.env.is_none() {
            metadata.env = self.metadata.env.clone();
        }
        if metadata.interface_num.is_none() {
            metadata.interface_num = self.metadata.interface_num.clone();
        }
        self.metadata = metadata;
        if let Some(graph) = graph {
            self.graph = graph;
        }
        log::info!("Imported {} action(s)", ids.len());
        self.baseline = Some(document);
        Ok(ids)
    }

    pub fn import_text(&mut self, text: &str) -> Result<Vec<ActionId>, ImportError> {
        let document = task::parse_str(text)?;
        self.import_document(document)
    }

    pub fn import_graph(&mut self, document: &Value) -> Result<usize, GraphError> {
        self.graph.import(document)
    }

    pub fn populate_graph_nodes(&mut self) -> Result<usize, GraphError> {
        self.graph.populate_from_actions(&self.store)
    }

    /// Compares the imported document with the current reconstruction.
    ///
    /// Both sides are written in the nested layout and share the imported
    /// metadata and edges, so only action differences show up.
    pub fn task_diff(&self) -> Result<TaskDiff, TaskError> {
        let baseline = self.baseline.as_ref().ok_or(TaskError::NoBaseline)?;
        let unexecuted = self
            .store
            .iter()
            .filter(|action| action.selected_operation().is_some() && !action.has_executed())
            .count();
        if unexecuted > 0 {
            return Err(TaskError::UnexecutedActions { count: unexecuted });
        }

        let mut current = baseline.clone();
        current.actions = build_actions(&self.store, &self.registry)?;
        let before = to_pretty_string(&baseline.to_value_in(DocumentShape::Nested));
        let after = to_pretty_string(&current.to_value_in(DocumentShape::Nested));
        Ok(TaskDiff::between(&before, &after))
    }
}

/// Raw input text for each argument, as a user would have typed it.
///
/// Float-flagged whole numbers come back as `N.0` so they are flagged again
/// when re-coerced; objects and arrays become compact JSON.
fn raw_inputs_from_arguments(arguments: &Map<String, Value>) -> Vec<(String, String)> {
    let Value::Object(rendered) = render(&Value::Object(arguments.clone())) else {
        return Vec::new();
    };
    rendered
        .into_iter()
        .map(|(field, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => serde_json::to_string(&other).unwrap_or_default(),
            };
            (field, text)
        })
        .collect()
}
